//! fitplanner - Workout planner with AI-generated routines

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use fitplanner::ai::{GeminiClient, GenerativeService};
use fitplanner::coach::Coach;
use fitplanner::db::Database;
use fitplanner::enrichment::{Panel, load_detail};
use fitplanner::exercises::{MuscleGroup, filter_exercises, find_exercise};
use fitplanner::generator::{Equipment, Experience, Focus, GeneratorStep, Intensity, RoutineGenerator};
use fitplanner::models::{GOALS, ProfileField, Workout};
use fitplanner::planner::{self, ExerciseField, Planner, export_as_text};
use fitplanner::session::Session;
use fitplanner::tui::App;

#[derive(Parser)]
#[command(name = "fitplanner")]
#[command(author, version, about = "Workout planner with AI-generated routines")]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "FITPLANNER_DB", default_value = "fitplanner.db")]
    db: String,

    /// Account e-mail
    #[arg(long, global = true, env = "FITPLANNER_EMAIL")]
    email: Option<String>,

    /// Account password
    #[arg(long, global = true, env = "FITPLANNER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Create a new account
    Register,

    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// List the exercise library
    Catalog {
        /// Case-insensitive search over name and muscle group
        #[arg(short, long, default_value = "")]
        search: String,

        /// Muscle group label (e.g., "Peito", "Cardio")
        #[arg(short, long)]
        muscle: Option<String>,
    },

    /// Anatomy image, biomechanics and tutorial videos for one exercise
    Exercise {
        /// Catalog id (e.g., "p1")
        id: String,

        /// Write the generated image to this file
        #[arg(long)]
        image_out: Option<String>,
    },

    /// Manage saved workouts
    Workout {
        #[command(subcommand)]
        action: WorkoutAction,
    },

    /// Ask the routine architect for a weekly plan
    Generate {
        /// Training days per week (3-6)
        #[arg(short, long, default_value = "5")]
        days: u8,

        #[arg(long, value_enum, default_value = "moderada")]
        intensity: Intensity,

        #[arg(long, value_enum, default_value = "intermediario")]
        experience: Experience,

        #[arg(long, value_enum, default_value = "equilibrado")]
        focus: Focus,

        #[arg(long, value_enum, default_value = "academia")]
        equipment: Equipment,

        /// Append the generated workouts to the saved ones
        #[arg(long)]
        save: bool,
    },

    /// Chat with the AI coach
    Coach,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the profile
    Show,

    /// Set one field: name, age, weight or goal
    Set { field: String, value: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for planner::Direction {
    fn from(value: MoveDirection) -> Self {
        match value {
            MoveDirection::Up => planner::Direction::Up,
            MoveDirection::Down => planner::Direction::Down,
        }
    }
}

#[derive(Subcommand)]
enum WorkoutAction {
    /// List workouts and their exercises
    List,

    /// Create an empty workout
    New,

    /// Rename a workout
    Rename { workout: String, title: String },

    /// Add a catalog exercise to a workout
    Add { workout: String, exercise: String },

    /// Edit an exercise field: name, sets, reps or rest
    Edit {
        workout: String,
        index: usize,
        field: String,
        value: String,
    },

    /// Move an exercise one position
    Move {
        workout: String,
        index: usize,
        #[arg(value_enum)]
        direction: MoveDirection,
    },

    /// Remove an exercise
    Remove { workout: String, index: usize },

    /// Delete a workout
    Delete {
        workout: String,

        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print the share text of a workout
    Share { workout: String },
}

fn login(db: Database, email: Option<&str>, password: Option<&str>) -> Result<Session> {
    let (Some(email), Some(password)) = (email, password) else {
        bail!("--email and --password (or FITPLANNER_EMAIL/FITPLANNER_PASSWORD) are required");
    };
    let mut session = Session::new(db);
    session.login(email, password)?;
    Ok(session)
}

fn print_workout(workout: &Workout) {
    println!("{} | {} ({} exercícios)", workout.id, workout.title, workout.exercises.len());
    for (i, ex) in workout.exercises.iter().enumerate() {
        println!("  {:2}. {:36} {}x{} | descanso {}", i, ex.name, ex.sets, ex.reps, ex.rest);
    }
}

fn not_found(found: bool, what: &str) -> Result<()> {
    if !found {
        bail!("{what} not found");
    }
    Ok(())
}

fn run_workout(session: &mut Session, action: WorkoutAction) -> Result<()> {
    let mut planner = Planner::new();

    match action {
        WorkoutAction::List => {
            if session.workouts().is_empty() {
                println!("Nenhum treino salvo.");
            }
            for w in session.workouts() {
                print_workout(w);
            }
        }

        WorkoutAction::New => {
            let id = session.update(|data| planner.create_workout(&mut data.workouts))?;
            println!("Created: {} (id: {})", planner::NEW_WORKOUT_TITLE, id);
        }

        WorkoutAction::Rename { workout, title } => {
            let found = session.update(|data| planner.rename_workout(&mut data.workouts, &workout, &title))?;
            not_found(found, "workout")?;
        }

        WorkoutAction::Add { workout, exercise } => {
            let exercise = find_exercise(&exercise).with_context(|| format!("unknown exercise: {exercise}"))?;
            let found = session.update(|data| planner.add_exercise(&mut data.workouts, &workout, exercise))?;
            not_found(found, "workout")?;
            println!("Added: {}", exercise.name);
        }

        WorkoutAction::Edit { workout, index, field, value } => {
            let field = ExerciseField::parse(&field).with_context(|| format!("unknown field: {field}"))?;
            let found =
                session.update(|data| planner.edit_field(&mut data.workouts, &workout, index, field, &value))?;
            not_found(found, "exercise")?;
        }

        WorkoutAction::Move { workout, index, direction } => {
            let moved =
                session.update(|data| planner.reorder(&mut data.workouts, &workout, index, direction.into()))?;
            if !moved {
                println!("Nothing to move.");
            }
        }

        WorkoutAction::Remove { workout, index } => {
            let found = session.update(|data| planner.remove_exercise(&mut data.workouts, &workout, index))?;
            not_found(found, "exercise")?;
        }

        WorkoutAction::Delete { workout, yes } => {
            let now = std::time::Instant::now();
            if !planner.request_delete(session.workouts(), &workout, now) {
                bail!("workout not found");
            }
            if !yes {
                println!("Re-run with --yes to delete {workout}.");
                return Ok(());
            }
            session.update(|data| planner.confirm_delete(&mut data.workouts, &workout, now))?;
            println!("Deleted: {workout}");
        }

        WorkoutAction::Share { workout } => {
            let workout = session
                .workouts()
                .iter()
                .find(|w| w.id == workout)
                .with_context(|| format!("workout not found: {workout}"))?;
            println!("{}", export_as_text(workout));
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)?;
    let email = cli.email.as_deref();
    let password = cli.password.as_deref();

    match cli.command {
        Some(Commands::Register) => {
            let (Some(email), Some(password)) = (email, password) else {
                bail!("--email and --password are required");
            };
            let mut session = Session::new(db);
            session.register(email, password)?;
            println!("Registered: {email}");
        }

        Some(Commands::Profile { action }) => {
            let mut session = login(db, email, password)?;
            match action {
                Some(ProfileAction::Set { field, value }) => {
                    let field = ProfileField::parse(&field).with_context(|| format!("unknown field: {field}"))?;
                    if field == ProfileField::Goal && !GOALS.contains(&value.as_str()) {
                        bail!("goal must be one of: {}", GOALS.join(", "));
                    }
                    session.set_profile_field(field, &value)?;
                }
                Some(ProfileAction::Show) | None => {
                    for field in ProfileField::all() {
                        println!("{:12} {}", field.label(), session.profile().get(*field));
                    }
                }
            }
        }

        Some(Commands::Catalog { search, muscle }) => {
            let muscle = match muscle {
                Some(label) => {
                    let group = MuscleGroup::from_label(&label);
                    Some(group.with_context(|| format!("unknown muscle group: {label}"))?)
                }
                None => None,
            };
            let exercises = filter_exercises(&search, muscle);
            println!("{:8} | {:36} | {}", "ID", "Nome", "Músculo");
            println!("{:-<64}", "");
            for e in &exercises {
                println!("{:8} | {:36} | {}", e.id, e.name, e.muscle.label());
            }
            println!("{} exercícios", exercises.len());
        }

        Some(Commands::Exercise { id, image_out }) => {
            let exercise = find_exercise(&id).with_context(|| format!("unknown exercise: {id}"))?;
            let client = GeminiClient::from_env()?;
            let detail = load_detail(&client, exercise).await;

            println!("{} ({})", exercise.name, exercise.muscle.label());
            println!("{}", exercise.instructions);
            println!();

            match &detail.analysis {
                Panel::Ready(a) => {
                    println!("Execução: {}", a.execution);
                    println!("Músculos: {}", a.muscles);
                    println!("Dica: {}", a.tip);
                }
                Panel::Failed(msg) => println!("Análise: {msg}"),
                Panel::Loading => {}
            }

            match &detail.image {
                Panel::Ready(image) => match &image_out {
                    Some(path) => {
                        std::fs::write(path, &image.data).with_context(|| format!("writing {path}"))?;
                        println!("Imagem: {path}");
                    }
                    None => println!("Imagem: {} ({} bytes)", image.mime_type, image.data.len()),
                },
                Panel::Failed(msg) => println!("Imagem: {msg}"),
                Panel::Loading => {}
            }

            match &detail.videos {
                Panel::Ready(videos) if !videos.is_empty() => {
                    for v in videos {
                        println!("Vídeo: {} - {}", v.title, v.uri);
                    }
                }
                Panel::Failed(msg) => println!("Vídeos: {msg}"),
                _ => println!("Buscar no YouTube: {}", detail.search_url()),
            }
        }

        Some(Commands::Workout { action }) => {
            let mut session = login(db, email, password)?;
            run_workout(&mut session, action)?;
        }

        Some(Commands::Generate { days, intensity, experience, focus, equipment, save }) => {
            let mut session = login(db, email, password)?;
            let mut generator = RoutineGenerator::default();
            if !generator.questionnaire.set_days_per_week(days) {
                bail!("days must be between 3 and 6");
            }
            generator.questionnaire.intensity = intensity;
            generator.questionnaire.experience = experience;
            generator.questionnaire.focus = focus;
            generator.questionnaire.equipment = equipment;

            let client = GeminiClient::from_env()?;
            let count = session.generate(&mut generator, &client).await?;
            println!("Rotina gerada: {count} treinos");
            if let GeneratorStep::Review(routine) = generator.step() {
                for w in routine {
                    print_workout(w);
                }
            }

            if save {
                let saved = session.save_generated(&mut generator)?;
                println!("Saved: {saved} workouts");
            }
        }

        Some(Commands::Coach) => {
            let session = login(db, email, password)?;
            let client = GeminiClient::from_env()?;
            let mut coach = Coach::new(session.profile());
            if let Some(greeting) = coach.transcript().first() {
                println!("Coach: {}", greeting.text);
            }

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some(reply) = coach.send(&client, &line, session.profile(), session.workouts()).await {
                    println!("Coach: {}", reply.text);
                }
            }
        }

        Some(Commands::Tui) | None => {
            let session = login(db, email, password)?;
            let service = match GeminiClient::from_env() {
                Ok(client) => Some(Arc::new(client) as Arc<dyn GenerativeService>),
                Err(e) => {
                    warn!(error = %e, "exercise detail disabled");
                    None
                }
            };
            let mut app = App::new(session, service);
            app.run()?;
            if app.session().identity().is_none() {
                println!("Sessão encerrada.");
            }
        }
    }

    Ok(())
}
