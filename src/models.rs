//! Domain records - profile, workouts and credentials

use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

use crate::exercises::Exercise;

/// Length of generated workout ids
const ID_LEN: usize = 9;

/// Stored login record. The secret is kept verbatim, not hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    #[serde(rename = "passwordHash")]
    pub secret: String,
}

/// Free-text athlete profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub goal: String,
}

/// Editable profile fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Age,
    Weight,
    Goal,
}

impl ProfileField {
    pub fn all() -> &'static [ProfileField] {
        &[ProfileField::Name, ProfileField::Age, ProfileField::Weight, ProfileField::Goal]
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "name" => Some(ProfileField::Name),
            "age" => Some(ProfileField::Age),
            "weight" => Some(ProfileField::Weight),
            "goal" => Some(ProfileField::Goal),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Name => "Nome",
            ProfileField::Age => "Idade",
            ProfileField::Weight => "Peso (kg)",
            ProfileField::Goal => "Objetivo",
        }
    }
}

/// Goals offered by the profile editor
pub const GOALS: &[&str] = &["Hipertrofia", "Emagrecimento", "Condicionamento", "Força"];

/// Goal that forces cardio onto every generated day
pub const WEIGHT_LOSS_GOAL: &str = "Emagrecimento";

impl Profile {
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Age => &self.age,
            ProfileField::Weight => &self.weight,
            ProfileField::Goal => &self.goal,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::Name => self.name = value,
            ProfileField::Age => self.age = value,
            ProfileField::Weight => self.weight = value,
            ProfileField::Goal => self.goal = value,
        }
    }

    pub fn has_goal(&self) -> bool {
        !self.goal.trim().is_empty()
    }
}

/// Catalog exercise copied into a workout with its own training parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: String,
    pub name: String,
    pub muscle: String,
    pub instructions: String,
    pub sets: u32,
    pub reps: String,
    pub rest: String,
}

impl WorkoutExercise {
    /// Default prescription used by the planner
    pub fn from_catalog(exercise: &Exercise) -> Self {
        Self::with_specs(exercise, 3, "12", "60s")
    }

    pub fn with_specs(exercise: &Exercise, sets: u32, reps: &str, rest: &str) -> Self {
        Self {
            id: exercise.id.to_string(),
            name: exercise.name.to_string(),
            muscle: exercise.muscle.label().to_string(),
            instructions: exercise.instructions.to_string(),
            sets,
            reps: reps.to_string(),
            rest: rest.to_string(),
        }
    }
}

/// Named, ordered list of exercises
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub title: String,
    pub exercises: Vec<WorkoutExercise>,
}

impl Workout {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            exercises: Vec::new(),
        }
    }
}

/// Everything persisted for one identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub profile: Profile,
    pub workouts: Vec<Workout>,
}

/// Random lowercase alphanumeric id
pub fn new_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect()
}
