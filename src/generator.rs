//! AI routine generator - questionnaire, prompt, schema and catalog hydration

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::ai::{AiError, GenerativeService, Schema};
use crate::exercises::{CATALOG, catalog_listing, find_exercise, is_cardio};
use crate::models::{Profile, WEIGHT_LOSS_GOAL, Workout, WorkoutExercise, new_id};

/// Title for generated workouts the model left untitled
pub const FALLBACK_TITLE: &str = "Treino Planejado";

/// Cardio appended to weight-loss days that lack one
const DEFAULT_CARDIO_ID: &str = "cardio1";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Por favor, preencha seu objetivo no Perfil primeiro!")]
    MissingGoal,
    #[error("Erro ao processar a inteligência artificial. Tente novamente.")]
    Service(#[from] AiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Intensity {
    #[value(name = "moderada")]
    Moderate,
    #[value(name = "alta")]
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Experience {
    #[value(name = "iniciante")]
    Beginner,
    #[value(name = "intermediario")]
    Intermediate,
    #[value(name = "avancado")]
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Focus {
    #[value(name = "equilibrado")]
    Balanced,
    #[value(name = "superiores")]
    Upper,
    #[value(name = "inferiores")]
    Lower,
    #[value(name = "posterior")]
    PosteriorChain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Equipment {
    #[value(name = "academia")]
    FullGym,
    #[value(name = "pesos_livres")]
    FreeWeights,
}

/// Wire token used in the prompt, same as the CLI value
fn token<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

impl Equipment {
    fn describe(&self) -> &'static str {
        match self {
            Equipment::FullGym => "Academia Completa",
            Equipment::FreeWeights => "Apenas Pesos Livres/Halteres",
        }
    }
}

pub const ALLOWED_DAYS: std::ops::RangeInclusive<u8> = 3..=6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    days_per_week: u8,
    pub intensity: Intensity,
    pub experience: Experience,
    pub focus: Focus,
    pub equipment: Equipment,
}

impl Default for Questionnaire {
    fn default() -> Self {
        Self {
            days_per_week: 5,
            intensity: Intensity::Moderate,
            experience: Experience::Intermediate,
            focus: Focus::Balanced,
            equipment: Equipment::FullGym,
        }
    }
}

impl Questionnaire {
    pub fn days_per_week(&self) -> u8 {
        self.days_per_week
    }

    /// Set days per week; values outside 3..=6 are rejected
    pub fn set_days_per_week(&mut self, days: u8) -> bool {
        if ALLOWED_DAYS.contains(&days) {
            self.days_per_week = days;
            true
        } else {
            false
        }
    }
}

/// `[{title, exercises: [{id, sets, reps, rest}]}]`
pub fn routine_schema() -> Schema {
    Schema::array(workout_schema())
}

fn workout_schema() -> Schema {
    Schema::object(
        [("title", Schema::String), ("exercises", Schema::array(exercise_schema()))],
        &["title", "exercises"],
    )
}

fn exercise_schema() -> Schema {
    Schema::object(
        [
            ("id", Schema::String),
            ("sets", Schema::Integer),
            ("reps", Schema::String),
            ("rest", Schema::String),
        ],
        &["id", "sets", "reps", "rest"],
    )
}

pub fn build_prompt(profile: &Profile, q: &Questionnaire) -> String {
    let days = q.days_per_week;
    format!(
        "Atue como um Personal Trainer de elite e monte uma ROTINA SEMANAL de exatamente {days} dias.\n\
         Perfil do atleta:\n\
         - Objetivo principal: {goal}\n\
         - Experiência: {experience} (iniciantes ficam nos básicos, avançados em volume e técnicas)\n\
         - Foco: {focus} (priorize exercícios desta área)\n\
         - Equipamento: {equipment}\n\
         - Dados: {age} anos, {weight}kg\n\
         - Frequência: {days} dias por semana\n\
         - Intensidade: {intensity}\n\n\
         Use SOMENTE exercícios desta biblioteca:\n{catalog}\n\n\
         Regras:\n\
         1. Com 3 dias, divida obrigatoriamente em Dia A: Peito/Tríceps/Ombros, Dia B: Costas/Bíceps/Antebraço, Dia C: Pernas/Panturrilha/Glúteo.\n\
         2. Foco \"superiores\" aumenta o volume de peito/costas/braços; foco \"inferiores\" aumenta quadríceps/posteriores.\n\
         3. Equipamento \"pesos_livres\" prioriza halteres e barras e evita máquinas, usando variações livres equivalentes da lista.\n\
         4. Objetivo \"{weight_loss}\": inclua Cardio (cardio1-4) no final de CADA treino.\n\n\
         Responda com um array JSON de treinos com title e exercises (id, sets, reps, rest).",
        goal = profile.goal,
        experience = token(q.experience),
        focus = token(q.focus),
        equipment = q.equipment.describe(),
        age = profile.age,
        weight = profile.weight,
        intensity = token(q.intensity),
        catalog = catalog_listing(),
        weight_loss = WEIGHT_LOSS_GOAL,
    )
}

#[derive(Debug, Deserialize)]
struct GeneratedExercise {
    id: String,
    sets: u32,
    reps: String,
    rest: String,
}

/// Turn the model response into workouts.
///
/// Workouts without an exercise list and exercises that do not match the
/// schema or name an unknown catalog id are dropped.
pub fn hydrate_routine(value: &Value) -> Result<Vec<Workout>, AiError> {
    let items = value
        .as_array()
        .ok_or_else(|| AiError::Decode("routine is not a JSON array".into()))?;

    let exercise_schema = exercise_schema();
    let mut routine = Vec::with_capacity(items.len());

    for item in items {
        let Some(exercises) = item.get("exercises").and_then(Value::as_array) else {
            warn!("dropping generated workout without exercises");
            continue;
        };

        let hydrated: Vec<WorkoutExercise> = exercises
            .iter()
            .filter(|e| exercise_schema.conforms(e))
            .filter_map(|e| serde_json::from_value::<GeneratedExercise>(e.clone()).ok())
            .filter_map(|ge| {
                let base = find_exercise(&ge.id);
                if base.is_none() {
                    warn!(id = %ge.id, "dropping unknown exercise id");
                }
                base.map(|ex| WorkoutExercise::with_specs(ex, ge.sets, &ge.reps, &ge.rest))
            })
            .collect();

        let title = item
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(FALLBACK_TITLE);

        routine.push(Workout {
            id: new_id(),
            title: title.to_string(),
            exercises: hydrated,
        });
    }

    Ok(routine)
}

pub fn is_weight_loss(profile: &Profile) -> bool {
    profile.goal.trim().eq_ignore_ascii_case(WEIGHT_LOSS_GOAL)
}

/// Weight-loss routines get cardio on every day, whatever the model did
fn enforce_goal_rules(profile: &Profile, routine: &mut [Workout]) {
    if !is_weight_loss(profile) {
        return;
    }
    let Some(cardio) = CATALOG.iter().find(|e| e.id == DEFAULT_CARDIO_ID) else {
        return;
    };
    for workout in routine.iter_mut() {
        if !workout.exercises.iter().any(|e| is_cardio(&e.id)) {
            workout.exercises.push(WorkoutExercise::with_specs(cardio, 1, "20 min", "-"));
        }
    }
}

/// One full generation round trip
pub async fn generate_routine(
    service: &dyn GenerativeService,
    profile: &Profile,
    questionnaire: &Questionnaire,
) -> Result<Vec<Workout>, GenerateError> {
    if !profile.has_goal() {
        return Err(GenerateError::MissingGoal);
    }

    let prompt = build_prompt(profile, questionnaire);
    let result = service
        .generate_json(&prompt, Some(&routine_schema()))
        .await
        .and_then(|value| hydrate_routine(&value));

    match result {
        Ok(mut routine) => {
            enforce_goal_rules(profile, &mut routine);
            info!(workouts = routine.len(), "routine generated");
            Ok(routine)
        }
        Err(e) => {
            error!(error = %e, "routine generation failed");
            Err(GenerateError::Service(e))
        }
    }
}

/// Generator flow: questionnaire, then review of the generated routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorStep {
    Questionnaire,
    Review(Vec<Workout>),
}

#[derive(Debug, Clone)]
pub struct RoutineGenerator {
    pub questionnaire: Questionnaire,
    step: GeneratorStep,
}

impl Default for RoutineGenerator {
    fn default() -> Self {
        Self {
            questionnaire: Questionnaire::default(),
            step: GeneratorStep::Questionnaire,
        }
    }
}

impl RoutineGenerator {
    pub fn step(&self) -> &GeneratorStep {
        &self.step
    }

    /// Generate and move to review; any failure returns to the questionnaire
    pub async fn generate(&mut self, service: &dyn GenerativeService, profile: &Profile) -> Result<&[Workout], GenerateError> {
        self.step = GeneratorStep::Questionnaire;
        let routine = generate_routine(service, profile, &self.questionnaire).await?;
        self.step = GeneratorStep::Review(routine);
        match &self.step {
            GeneratorStep::Review(routine) => Ok(routine),
            GeneratorStep::Questionnaire => Ok(&[]),
        }
    }

    /// Hand the reviewed routine over for saving and start again
    pub fn take_routine(&mut self) -> Option<Vec<Workout>> {
        match std::mem::replace(&mut self.step, GeneratorStep::Questionnaire) {
            GeneratorStep::Review(routine) => Some(routine),
            GeneratorStep::Questionnaire => None,
        }
    }
}
