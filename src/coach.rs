//! Conversational coach - local transcript, stateless model calls

use tracing::{debug, error};

use crate::ai::GenerativeService;
use crate::exercises::CATALOG;
use crate::models::{Profile, Workout};

const EMPTY_REPLY: &str = "Tive um pequeno lapso de memória. Pode repetir?";
const ERROR_REPLY: &str = "Erro de conexão. O servidor de elite está em manutenção rápida.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value }
}

pub fn greeting(profile: &Profile) -> String {
    format!(
        "Olá {}! Sou seu Coach AI. Analisei seu perfil de {} e estou pronto para te ajudar. Como está o foco hoje?",
        or_default(&profile.name, "atleta"),
        or_default(&profile.goal, "treino"),
    )
}

/// System instruction rebuilt from local state on every turn
pub fn system_context(profile: &Profile, workouts: &[Workout]) -> String {
    let titles: Vec<&str> = workouts.iter().map(|w| w.title.as_str()).collect();
    let catalog: Vec<String> = CATALOG
        .iter()
        .map(|e| format!("- {} ({})", e.name, e.muscle.label()))
        .collect();

    format!(
        "Você é o \"Coach AI\", um personal trainer de elite.\n\
         Atleta atual:\n\
         - Nome: {name}\n\
         - Objetivo: {goal}\n\
         - Peso: {weight}kg\n\
         - Treinos salvos: {titles}\n\n\
         Biblioteca disponível:\n{catalog}\n\n\
         Regras:\n\
         1. Responda em português (PT-BR).\n\
         2. Seja motivador, mas técnico e preciso.\n\
         3. Se perguntarem sobre os treinos do atleta, cite os nomes salvos.\n\
         4. No máximo 3 parágrafos.",
        name = or_default(&profile.name, "Usuário"),
        goal = profile.goal,
        weight = profile.weight,
        titles = titles.join(", "),
        catalog = catalog.join(", "),
    )
}

/// Append-only chat transcript
#[derive(Debug, Clone)]
pub struct Coach {
    transcript: Vec<Turn>,
}

impl Coach {
    /// New transcript seeded with the greeting
    pub fn new(profile: &Profile) -> Self {
        Self {
            transcript: vec![Turn {
                role: Role::Assistant,
                text: greeting(profile),
            }],
        }
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    fn push(&mut self, role: Role, text: impl Into<String>) {
        self.transcript.push(Turn { role, text: text.into() });
    }

    /// Send one user message. Blank input is ignored and returns `None`;
    /// otherwise returns the assistant turn that was appended.
    pub async fn send(
        &mut self,
        service: &dyn GenerativeService,
        message: &str,
        profile: &Profile,
        workouts: &[Workout],
    ) -> Option<&Turn> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        self.push(Role::User, message);

        let context = system_context(profile, workouts);
        debug!(context_len = context.len(), "sending coach message");

        let reply = match service.generate_text(message, Some(&context)).await {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "coach request failed");
                ERROR_REPLY.to_string()
            }
        };
        self.push(Role::Assistant, reply);
        self.transcript.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedService;

    fn profile() -> Profile {
        Profile {
            name: "Bia".into(),
            age: "28".into(),
            weight: "60".into(),
            goal: "Força".into(),
        }
    }

    #[test]
    fn test_greeting_uses_profile_or_defaults() {
        assert!(greeting(&profile()).starts_with("Olá Bia! "));
        assert!(greeting(&profile()).contains("perfil de Força"));
        let empty = greeting(&Profile::default());
        assert!(empty.starts_with("Olá atleta! "));
        assert!(empty.contains("perfil de treino"));
    }

    #[test]
    fn test_system_context_includes_state() {
        let workouts = vec![Workout::new("Treino A"), Workout::new("Treino B")];
        let context = system_context(&profile(), &workouts);
        assert!(context.contains("- Nome: Bia"));
        assert!(context.contains("- Peso: 60kg"));
        assert!(context.contains("Treinos salvos: Treino A, Treino B"));
        assert!(context.contains("- Elíptico (Cardio)"));
    }

    #[tokio::test]
    async fn test_send_appends_both_turns() {
        let service = ScriptedService {
            text: Some("Bora treinar!".into()),
            ..Default::default()
        };
        let mut coach = Coach::new(&profile());
        let workouts = vec![Workout::new("Pernas")];
        let reply = coach.send(&service, "  E hoje?  ", &profile(), &workouts).await.unwrap();
        assert_eq!(reply.text, "Bora treinar!");

        let transcript = coach.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1], Turn { role: Role::User, text: "E hoje?".into() });
        assert_eq!(transcript[2].role, Role::Assistant);

        let calls = service.text_calls.lock().unwrap();
        assert_eq!(calls[0].0, "E hoje?");
        assert!(calls[0].1.as_deref().unwrap().contains("Treinos salvos: Pernas"));
    }

    #[tokio::test]
    async fn test_context_rebuilt_each_turn() {
        let service = ScriptedService {
            text: Some("ok".into()),
            ..Default::default()
        };
        let mut coach = Coach::new(&profile());
        coach.send(&service, "um", &profile(), &[]).await;
        coach.send(&service, "dois", &profile(), &[Workout::new("Novo")]).await;

        let calls = service.text_calls.lock().unwrap();
        assert!(!calls[0].1.as_deref().unwrap().contains("Novo"));
        assert!(calls[1].1.as_deref().unwrap().contains("Treinos salvos: Novo"));
    }

    #[tokio::test]
    async fn test_failure_appends_generic_turn() {
        let service = ScriptedService::default();
        let mut coach = Coach::new(&profile());
        let reply = coach.send(&service, "oi", &profile(), &[]).await.unwrap();
        assert_eq!(reply.text, ERROR_REPLY);
        assert_eq!(coach.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_reply_and_blank_input() {
        let service = ScriptedService {
            text: Some("   ".into()),
            ..Default::default()
        };
        let mut coach = Coach::new(&profile());
        assert!(coach.send(&service, "   ", &profile(), &[]).await.is_none());
        assert_eq!(coach.transcript().len(), 1);

        let reply = coach.send(&service, "oi", &profile(), &[]).await.unwrap();
        assert_eq!(reply.text, EMPTY_REPLY);
    }
}
