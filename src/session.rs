//! Application session - authenticated identity, active tab and the
//! identity's persisted data. Every mutation is written back immediately.

use anyhow::{Result, bail};
use tracing::info;

use crate::ai::GenerativeService;
use crate::auth::{self, AuthError};
use crate::db::Database;
use crate::generator::{GenerateError, RoutineGenerator};
use crate::models::{Profile, ProfileField, UserData, Workout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    Profile,
    Library,
    #[default]
    Routines,
    AiGenerator,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Routines, Tab::AiGenerator, Tab::Library, Tab::Profile]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Profile => "Perfil",
            Tab::Library => "Biblioteca",
            Tab::Routines => "Treinos",
            Tab::AiGenerator => "Arquiteto IA",
        }
    }
}

pub struct Session {
    db: Database,
    identity: Option<String>,
    data: UserData,
    tab: Tab,
}

impl Session {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            identity: None,
            data: UserData::default(),
            tab: Tab::default(),
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn data(&self) -> &UserData {
        &self.data
    }

    pub fn profile(&self) -> &Profile {
        &self.data.profile
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.data.workouts
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn register(&mut self, email: &str, secret: &str) -> Result<(), AuthError> {
        let email = auth::register(&self.db, email, secret)?;
        self.start(email)?;
        Ok(())
    }

    pub fn login(&mut self, email: &str, secret: &str) -> Result<(), AuthError> {
        let email = auth::login(&self.db, email, secret)?;
        self.start(email)?;
        Ok(())
    }

    /// Load stored data, creating an empty record on first login
    fn start(&mut self, email: String) -> Result<()> {
        let data = match self.db.get_user_data(&email)? {
            Some(data) => data,
            None => {
                let data = UserData::default();
                self.db.save_user_data(&email, &data)?;
                info!(email = %email, "created empty user data");
                data
            }
        };
        self.data = data;
        self.identity = Some(email);
        self.tab = Tab::default();
        Ok(())
    }

    pub fn logout(&mut self) {
        self.identity = None;
        self.data = UserData::default();
        self.tab = Tab::default();
    }

    /// Apply a mutation to the user data and persist the whole record
    pub fn update<R>(&mut self, f: impl FnOnce(&mut UserData) -> R) -> Result<R> {
        let Some(email) = self.identity.as_deref() else {
            bail!("not logged in");
        };
        let mut data = self.data.clone();
        let result = f(&mut data);
        self.db.save_user_data(email, &data)?;
        self.data = data;
        Ok(result)
    }

    pub fn set_profile_field(&mut self, field: ProfileField, value: &str) -> Result<()> {
        self.update(|data| data.profile.set(field, value))
    }

    /// Append generated workouts after the existing ones
    pub fn save_routine(&mut self, routine: Vec<Workout>) -> Result<usize> {
        let count = routine.len();
        self.update(|data| data.workouts.extend(routine))?;
        Ok(count)
    }

    /// Run the generator; a missing goal sends the user to the profile tab
    pub async fn generate(
        &mut self,
        generator: &mut RoutineGenerator,
        service: &dyn GenerativeService,
    ) -> Result<usize, GenerateError> {
        match generator.generate(service, &self.data.profile).await {
            Ok(routine) => Ok(routine.len()),
            Err(GenerateError::MissingGoal) => {
                self.tab = Tab::Profile;
                Err(GenerateError::MissingGoal)
            }
            Err(e) => Err(e),
        }
    }

    /// Persist the reviewed routine and switch to the routines tab
    pub fn save_generated(&mut self, generator: &mut RoutineGenerator) -> Result<usize> {
        let Some(routine) = generator.take_routine() else {
            return Ok(0);
        };
        let count = self.save_routine(routine)?;
        self.tab = Tab::Routines;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedService;
    use crate::exercises::find_exercise;
    use crate::models::WorkoutExercise;
    use serde_json::json;

    fn session() -> Session {
        Session::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_register_creates_empty_data() {
        let mut s = session();
        s.register("ana@x.com", "pw").unwrap();
        assert_eq!(s.identity(), Some("ana@x.com"));
        assert_eq!(s.data(), &UserData::default());
        assert!(s.db.get_user_data("ana@x.com").unwrap().is_some());
    }

    #[test]
    fn test_update_requires_login() {
        let mut s = session();
        assert!(s.set_profile_field(ProfileField::Name, "Ana").is_err());
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let mut s = session();
        s.register("ana@x.com", "pw").unwrap();
        s.set_profile_field(ProfileField::Goal, "Hipertrofia").unwrap();
        s.update(|data| {
            let mut w = Workout::new("Treino A");
            w.exercises.push(WorkoutExercise::from_catalog(find_exercise("p1").unwrap()));
            data.workouts.push(w);
        })
        .unwrap();
        let snapshot = s.data().clone();

        s.logout();
        assert_eq!(s.identity(), None);
        assert!(s.workouts().is_empty());

        s.login("ana@x.com", "pw").unwrap();
        assert_eq!(s.data(), &snapshot);
    }

    #[test]
    fn test_identities_are_isolated() {
        let mut s = session();
        s.register("ana@x.com", "pw").unwrap();
        s.set_profile_field(ProfileField::Name, "Ana").unwrap();
        s.logout();
        s.register("bob@x.com", "pw").unwrap();
        assert_eq!(s.profile().name, "");
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let mut s = session();
        s.register("ana@x.com", "pw").unwrap();
        s.set_profile_field(ProfileField::Name, "Ana").unwrap();
        s.db.drop_schema().unwrap();

        assert!(s.set_profile_field(ProfileField::Name, "Bia").is_err());
        assert!(s.update(|data| data.workouts.push(Workout::new("Perdido"))).is_err());
        assert_eq!(s.profile().name, "Ana");
        assert!(s.workouts().is_empty());
    }

    #[test]
    fn test_logout_resets_tab() {
        let mut s = session();
        s.register("ana@x.com", "pw").unwrap();
        s.set_tab(Tab::Library);
        s.logout();
        assert_eq!(s.tab(), Tab::Routines);
    }

    #[tokio::test]
    async fn test_generate_without_goal_redirects_to_profile() {
        let mut s = session();
        s.register("ana@x.com", "pw").unwrap();
        let mut generator = RoutineGenerator::default();
        let err = s.generate(&mut generator, &ScriptedService::default()).await.unwrap_err();
        assert!(matches!(err, GenerateError::MissingGoal));
        assert_eq!(s.tab(), Tab::Profile);
    }

    #[tokio::test]
    async fn test_save_generated_appends_and_switches_tab() {
        let mut s = session();
        s.register("ana@x.com", "pw").unwrap();
        s.set_profile_field(ProfileField::Goal, "Força").unwrap();
        s.update(|data| data.workouts.push(Workout::new("Existente"))).unwrap();
        s.set_tab(Tab::AiGenerator);

        let service = ScriptedService {
            json: Some(json!([
                { "title": "Dia A", "exercises": [{ "id": "p1", "sets": 3, "reps": "10", "rest": "60s" }] },
                { "title": "Dia B", "exercises": [] }
            ])),
            ..Default::default()
        };
        let mut generator = RoutineGenerator::default();
        assert_eq!(s.generate(&mut generator, &service).await.unwrap(), 2);
        assert_eq!(s.save_generated(&mut generator).unwrap(), 2);

        let titles: Vec<_> = s.workouts().iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["Existente", "Dia A", "Dia B"]);
        assert_eq!(s.tab(), Tab::Routines);
        assert_eq!(s.db.get_user_data("ana@x.com").unwrap().unwrap().workouts.len(), 3);
    }
}
