//! Routine planner - editing state machine over the saved workouts
//!
//! Each workout is in one of three states: not selected, selected for
//! editing, or pending delete. At most one workout is selected and at most
//! one is armed for deletion. An armed confirmation lapses after
//! [`CONFIRM_TIMEOUT`] or as soon as any other planner action runs.

use std::time::{Duration, Instant};

use tracing::info;

use crate::exercises::Exercise;
use crate::models::{Workout, WorkoutExercise};

/// How long a delete stays armed
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// Title given to freshly created workouts
pub const NEW_WORKOUT_TITLE: &str = "Novo Treino";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Editable fields of a workout exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseField {
    Name,
    Sets,
    Reps,
    Rest,
}

impl ExerciseField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "name" => Some(ExerciseField::Name),
            "sets" => Some(ExerciseField::Sets),
            "reps" => Some(ExerciseField::Reps),
            "rest" => Some(ExerciseField::Rest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutState {
    NotSelected,
    Editing,
    PendingDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Armed,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Confirmation {
    Idle,
    Armed { workout_id: String, armed_at: Instant },
}

/// Planner state: editing selection plus the delete confirmation
#[derive(Debug, Clone)]
pub struct Planner {
    selected: Option<String>,
    confirmation: Confirmation,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

/// Leading-digit parse, anything unusable becomes 0
fn parse_sets(value: &str) -> u32 {
    let digits: String = value.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn find_mut<'a>(workouts: &'a mut [Workout], id: &str) -> Option<&'a mut Workout> {
    workouts.iter_mut().find(|w| w.id == id)
}

impl Planner {
    pub fn new() -> Self {
        Self {
            selected: None,
            confirmation: Confirmation::Idle,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Id of the armed workout, if the arm has not lapsed at `now`
    pub fn armed(&self, now: Instant) -> Option<&str> {
        match &self.confirmation {
            Confirmation::Armed { workout_id, armed_at }
                if now.duration_since(*armed_at) < CONFIRM_TIMEOUT =>
            {
                Some(workout_id)
            }
            _ => None,
        }
    }

    pub fn state(&self, workout_id: &str, now: Instant) -> WorkoutState {
        if self.armed(now) == Some(workout_id) {
            WorkoutState::PendingDelete
        } else if self.selected.as_deref() == Some(workout_id) {
            WorkoutState::Editing
        } else {
            WorkoutState::NotSelected
        }
    }

    /// Drop a lapsed confirmation. Call from the UI tick.
    pub fn expire(&mut self, now: Instant) {
        if matches!(self.confirmation, Confirmation::Armed { .. }) && self.armed(now).is_none() {
            self.confirmation = Confirmation::Idle;
        }
    }

    /// Drop any armed confirmation without deleting
    pub fn disarm(&mut self) {
        self.confirmation = Confirmation::Idle;
    }

    pub fn select(&mut self, workouts: &[Workout], workout_id: &str) -> bool {
        self.disarm();
        if workouts.iter().any(|w| w.id == workout_id) {
            self.selected = Some(workout_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.disarm();
        self.selected = None;
    }

    /// Append an empty workout and open it for editing. Returns its id.
    pub fn create_workout(&mut self, workouts: &mut Vec<Workout>) -> String {
        self.disarm();
        let mut workout = Workout::new(NEW_WORKOUT_TITLE);
        while workouts.iter().any(|w| w.id == workout.id) {
            workout = Workout::new(NEW_WORKOUT_TITLE);
        }
        let id = workout.id.clone();
        workouts.push(workout);
        self.selected = Some(id.clone());
        id
    }

    pub fn rename_workout(&mut self, workouts: &mut [Workout], workout_id: &str, title: &str) -> bool {
        self.disarm();
        match find_mut(workouts, workout_id) {
            Some(w) => {
                w.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Append a catalog exercise with the default prescription
    pub fn add_exercise(&mut self, workouts: &mut [Workout], workout_id: &str, exercise: &Exercise) -> bool {
        self.disarm();
        match find_mut(workouts, workout_id) {
            Some(w) => {
                w.exercises.push(WorkoutExercise::from_catalog(exercise));
                true
            }
            None => false,
        }
    }

    pub fn edit_field(
        &mut self,
        workouts: &mut [Workout],
        workout_id: &str,
        index: usize,
        field: ExerciseField,
        value: &str,
    ) -> bool {
        self.disarm();
        let Some(ex) = find_mut(workouts, workout_id).and_then(|w| w.exercises.get_mut(index)) else {
            return false;
        };
        match field {
            ExerciseField::Name => ex.name = value.to_string(),
            ExerciseField::Sets => ex.sets = parse_sets(value),
            ExerciseField::Reps => ex.reps = value.to_string(),
            ExerciseField::Rest => ex.rest = value.to_string(),
        }
        true
    }

    /// Swap with the neighbour in `direction`. Out of bounds is a no-op.
    pub fn reorder(&mut self, workouts: &mut [Workout], workout_id: &str, index: usize, direction: Direction) -> bool {
        self.disarm();
        let Some(w) = find_mut(workouts, workout_id) else {
            return false;
        };
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        match target {
            Some(target) if index < w.exercises.len() && target < w.exercises.len() => {
                w.exercises.swap(index, target);
                true
            }
            _ => false,
        }
    }

    pub fn remove_exercise(&mut self, workouts: &mut [Workout], workout_id: &str, index: usize) -> bool {
        self.disarm();
        match find_mut(workouts, workout_id) {
            Some(w) if index < w.exercises.len() => {
                w.exercises.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Arm deletion of one workout, disarming any other
    pub fn request_delete(&mut self, workouts: &[Workout], workout_id: &str, now: Instant) -> bool {
        if !workouts.iter().any(|w| w.id == workout_id) {
            self.disarm();
            return false;
        }
        self.confirmation = Confirmation::Armed {
            workout_id: workout_id.to_string(),
            armed_at: now,
        };
        true
    }

    /// Delete if `workout_id` is armed and the arm has not lapsed
    pub fn confirm_delete(&mut self, workouts: &mut Vec<Workout>, workout_id: &str, now: Instant) -> bool {
        let armed = self.armed(now) == Some(workout_id);
        self.disarm();
        if !armed {
            return false;
        }

        let before = workouts.len();
        workouts.retain(|w| w.id != workout_id);
        if self.selected.as_deref() == Some(workout_id) {
            self.selected = None;
        }
        info!(workout_id, "workout deleted");
        workouts.len() < before
    }

    /// First press arms, second press on the same workout deletes
    pub fn toggle_delete(&mut self, workouts: &mut Vec<Workout>, workout_id: &str, now: Instant) -> Option<DeleteOutcome> {
        if self.armed(now) == Some(workout_id) {
            self.confirm_delete(workouts, workout_id, now).then_some(DeleteOutcome::Deleted)
        } else {
            self.request_delete(workouts, workout_id, now).then_some(DeleteOutcome::Armed)
        }
    }
}

/// Shareable plain-text rendering of a workout
pub fn export_as_text(workout: &Workout) -> String {
    let lines: Vec<String> = workout
        .exercises
        .iter()
        .enumerate()
        .map(|(i, ex)| {
            format!(
                "{}. {}\n   └ {} sets x {} ({} descanso)",
                i + 1,
                ex.name,
                ex.sets,
                ex.reps,
                ex.rest
            )
        })
        .collect();

    format!(
        "🔥 *FITPLANNER PRO - {}* 🔥\n\n{} \n\nGerado por FitPlanner Pro 🚀",
        workout.title.to_uppercase(),
        lines.join("\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::find_exercise;

    fn ids(workout: &Workout) -> Vec<&str> {
        workout.exercises.iter().map(|e| e.id.as_str()).collect()
    }

    fn setup() -> (Planner, Vec<Workout>, String) {
        let mut planner = Planner::new();
        let mut workouts = Vec::new();
        let id = planner.create_workout(&mut workouts);
        for ex in ["p1", "c4", "q1"] {
            planner.add_exercise(&mut workouts, &id, find_exercise(ex).unwrap());
        }
        (planner, workouts, id)
    }

    #[test]
    fn test_create_workout_selects_it() {
        let mut planner = Planner::new();
        let mut workouts = Vec::new();
        let id = planner.create_workout(&mut workouts);
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].title, NEW_WORKOUT_TITLE);
        assert!(workouts[0].exercises.is_empty());
        assert_eq!(planner.selected(), Some(id.as_str()));
        assert_eq!(planner.state(&id, Instant::now()), WorkoutState::Editing);
    }

    #[test]
    fn test_rename_allows_duplicate_titles() {
        let mut planner = Planner::new();
        let mut workouts = Vec::new();
        let a = planner.create_workout(&mut workouts);
        let b = planner.create_workout(&mut workouts);
        assert!(planner.rename_workout(&mut workouts, &a, "Pernas"));
        assert!(planner.rename_workout(&mut workouts, &b, "Pernas"));
        assert!(workouts.iter().all(|w| w.title == "Pernas"));
        assert!(!planner.rename_workout(&mut workouts, "missing", "x"));
    }

    #[test]
    fn test_add_appends_with_defaults() {
        let (_, workouts, _) = setup();
        assert_eq!(ids(&workouts[0]), vec!["p1", "c4", "q1"]);
        let last = workouts[0].exercises.last().unwrap();
        assert_eq!((last.sets, last.reps.as_str(), last.rest.as_str()), (3, "12", "60s"));
    }

    #[test]
    fn test_add_then_remove_restores_list() {
        let (mut planner, mut workouts, id) = setup();
        let before = workouts[0].exercises.clone();
        planner.add_exercise(&mut workouts, &id, find_exercise("b2").unwrap());
        let index = workouts[0].exercises.len() - 1;
        assert!(planner.remove_exercise(&mut workouts, &id, index));
        assert_eq!(workouts[0].exercises, before);
    }

    #[test]
    fn test_remove_shifts_following() {
        let (mut planner, mut workouts, id) = setup();
        assert!(planner.remove_exercise(&mut workouts, &id, 0));
        assert_eq!(ids(&workouts[0]), vec!["c4", "q1"]);
        assert!(!planner.remove_exercise(&mut workouts, &id, 5));
    }

    #[test]
    fn test_reorder_swaps_neighbours() {
        let (mut planner, mut workouts, id) = setup();
        assert!(planner.reorder(&mut workouts, &id, 0, Direction::Down));
        assert_eq!(ids(&workouts[0]), vec!["c4", "p1", "q1"]);
        assert!(planner.reorder(&mut workouts, &id, 2, Direction::Up));
        assert_eq!(ids(&workouts[0]), vec!["c4", "q1", "p1"]);
    }

    #[test]
    fn test_reorder_out_of_bounds_is_noop() {
        let (mut planner, mut workouts, id) = setup();
        let before = workouts.clone();
        assert!(!planner.reorder(&mut workouts, &id, 0, Direction::Up));
        assert!(!planner.reorder(&mut workouts, &id, 2, Direction::Down));
        assert!(!planner.reorder(&mut workouts, &id, 9, Direction::Up));
        assert_eq!(workouts, before);
    }

    #[test]
    fn test_edit_field_sets_coerces_invalid_to_zero() {
        let (mut planner, mut workouts, id) = setup();
        planner.edit_field(&mut workouts, &id, 0, ExerciseField::Sets, "abc");
        assert_eq!(workouts[0].exercises[0].sets, 0);
        planner.edit_field(&mut workouts, &id, 0, ExerciseField::Sets, "5");
        assert_eq!(workouts[0].exercises[0].sets, 5);
        planner.edit_field(&mut workouts, &id, 0, ExerciseField::Sets, "4x");
        assert_eq!(workouts[0].exercises[0].sets, 4);
    }

    #[test]
    fn test_edit_field_text_fields() {
        let (mut planner, mut workouts, id) = setup();
        planner.edit_field(&mut workouts, &id, 1, ExerciseField::Reps, "8-12");
        planner.edit_field(&mut workouts, &id, 1, ExerciseField::Rest, "90s");
        planner.edit_field(&mut workouts, &id, 1, ExerciseField::Name, "Remada pesada");
        let ex = &workouts[0].exercises[1];
        assert_eq!(ex.reps, "8-12");
        assert_eq!(ex.rest, "90s");
        assert_eq!(ex.name, "Remada pesada");
        assert_eq!(find_exercise("c4").unwrap().name, "Remada Curvada com Barra");
        assert!(!planner.edit_field(&mut workouts, &id, 7, ExerciseField::Reps, "1"));
    }

    #[test]
    fn test_confirm_deletes_and_clears_selection() {
        let (mut planner, mut workouts, id) = setup();
        let now = Instant::now();
        assert!(planner.request_delete(&workouts, &id, now));
        assert_eq!(planner.state(&id, now), WorkoutState::PendingDelete);
        assert!(planner.confirm_delete(&mut workouts, &id, now + Duration::from_secs(1)));
        assert!(workouts.is_empty());
        assert_eq!(planner.selected(), None);
    }

    #[test]
    fn test_arming_second_workout_disarms_first() {
        let mut planner = Planner::new();
        let mut workouts = Vec::new();
        let a = planner.create_workout(&mut workouts);
        let b = planner.create_workout(&mut workouts);
        let now = Instant::now();

        planner.request_delete(&workouts, &a, now);
        planner.request_delete(&workouts, &b, now);

        assert_eq!(planner.state(&a, now), WorkoutState::NotSelected);
        assert_eq!(planner.state(&b, now), WorkoutState::PendingDelete);
        assert!(!planner.confirm_delete(&mut workouts, &a, now));
        assert_eq!(workouts.len(), 2);
    }

    #[test]
    fn test_confirmation_times_out() {
        let (mut planner, mut workouts, id) = setup();
        let now = Instant::now();
        planner.request_delete(&workouts, &id, now);
        let later = now + CONFIRM_TIMEOUT;
        assert_eq!(planner.armed(later), None);
        assert!(!planner.confirm_delete(&mut workouts, &id, later));
        assert_eq!(workouts.len(), 1);
        assert_eq!(planner.state(&id, later), WorkoutState::Editing);
    }

    #[test]
    fn test_other_action_disarms() {
        let (mut planner, mut workouts, id) = setup();
        let now = Instant::now();
        planner.request_delete(&workouts, &id, now);
        planner.rename_workout(&mut workouts, &id, "Treino A");
        assert_eq!(planner.armed(now), None);
        assert!(!planner.confirm_delete(&mut workouts, &id, now));
        assert_eq!(workouts.len(), 1);
    }

    #[test]
    fn test_toggle_delete() {
        let (mut planner, mut workouts, id) = setup();
        let now = Instant::now();
        assert_eq!(planner.toggle_delete(&mut workouts, &id, now), Some(DeleteOutcome::Armed));
        assert_eq!(planner.toggle_delete(&mut workouts, &id, now), Some(DeleteOutcome::Deleted));
        assert!(workouts.is_empty());
        assert_eq!(planner.toggle_delete(&mut workouts, &id, now), None);
    }

    #[test]
    fn test_expire_resets_confirmation() {
        let (mut planner, workouts, id) = setup();
        let now = Instant::now();
        planner.request_delete(&workouts, &id, now);
        planner.expire(now + Duration::from_secs(1));
        assert_eq!(planner.armed(now + Duration::from_secs(1)), Some(id.as_str()));
        planner.expire(now + Duration::from_secs(6));
        assert_eq!(planner.armed(now), None);
    }

    #[test]
    fn test_export_as_text() {
        let (mut planner, mut workouts, id) = setup();
        planner.rename_workout(&mut workouts, &id, "Treino A");
        planner.remove_exercise(&mut workouts, &id, 2);
        let text = export_as_text(&workouts[0]);
        let expected = "🔥 *FITPLANNER PRO - TREINO A* 🔥\n\n\
            1. Supino Reto com Barra\n   └ 3 sets x 12 (60s descanso)\n\n\
            2. Remada Curvada com Barra\n   └ 3 sets x 12 (60s descanso) \n\n\
            Gerado por FitPlanner Pro 🚀";
        assert_eq!(text, expected);
    }
}
