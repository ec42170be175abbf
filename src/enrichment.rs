//! Exercise detail enrichment - anatomy image, biomechanics summary and
//! tutorial videos fetched in parallel, each panel failing on its own.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::ai::{Citation, GeneratedImage, GenerativeService, Schema};
use crate::exercises::Exercise;

pub const IMAGE_ASPECT_RATIO: &str = "1:1";

/// Hosts accepted as video references
pub const VIDEO_DOMAINS: &[&str] = &["youtube.com", "youtu.be"];

pub const MAX_VIDEOS: usize = 3;

const DEFAULT_VIDEO_TITLE: &str = "Tutorial de Execução";
const DEFAULT_TIP: &str = "Mantenha o controle na fase excêntrica.";
const PANEL_ERROR: &str = "Não foi possível carregar este conteúdo.";

/// Per-panel load state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Panel<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub execution: String,
    pub muscles: String,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub title: String,
    pub uri: String,
}

/// Result of one of the three requests
#[derive(Debug, Clone)]
pub enum DetailUpdate {
    Image(Panel<GeneratedImage>),
    Analysis(Panel<Analysis>),
    Videos(Panel<Vec<VideoRef>>),
}

#[derive(Debug, Clone)]
pub struct ExerciseDetail {
    pub exercise: &'static Exercise,
    pub image: Panel<GeneratedImage>,
    pub analysis: Panel<Analysis>,
    pub videos: Panel<Vec<VideoRef>>,
}

impl ExerciseDetail {
    pub fn new(exercise: &'static Exercise) -> Self {
        Self {
            exercise,
            image: Panel::Loading,
            analysis: Panel::Loading,
            videos: Panel::Loading,
        }
    }

    pub fn apply(&mut self, update: DetailUpdate) {
        match update {
            DetailUpdate::Image(panel) => self.image = panel,
            DetailUpdate::Analysis(panel) => self.analysis = panel,
            DetailUpdate::Videos(panel) => self.videos = panel,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.image.is_loading() && !self.analysis.is_loading() && !self.videos.is_loading()
    }

    /// Manual YouTube search for when no video reference survived
    pub fn search_url(&self) -> String {
        let query = format!("{} execução correta", self.exercise.name);
        Url::parse_with_params("https://www.youtube.com/results", &[("search_query", query)])
            .map(|u| u.to_string())
            .unwrap_or_else(|_| "https://www.youtube.com".to_string())
    }
}

pub fn image_prompt(exercise: &Exercise) -> String {
    format!(
        "Clinical anatomical fitness illustration of the exercise: {name}.\n\
         Subject: translucent charcoal-grey human figure showing skeleton and muscles.\n\
         Highlight: the {muscle} muscles glow in vivid neon violet.\n\
         Background: solid black (#000000).\n\
         Viewpoint: technical angle that shows this exercise's range of motion.\n\
         No faces, no gym scenery, biomechanics only.",
        name = exercise.name,
        muscle = exercise.muscle.label(),
    )
}

pub fn analysis_prompt(exercise: &Exercise) -> String {
    format!(
        "Faça uma análise biomecânica curtíssima do exercício {}. \
         Responda em JSON com execution (3 passos objetivos), muscles (músculos envolvidos) \
         e tip (uma dica de ouro para performance).",
        exercise.name
    )
}

pub fn video_prompt(exercise: &Exercise) -> String {
    format!(
        "Encontre os melhores vídeos de execução e tutoriais no YouTube para o exercício {}, \
         com foco em técnica correta.",
        exercise.name
    )
}

fn analysis_schema() -> Schema {
    Schema::object(
        [
            ("execution", Schema::array(Schema::String)),
            ("muscles", Schema::String),
            ("tip", Schema::String),
        ],
        &["execution", "muscles", "tip"],
    )
}

/// String, or array of strings joined by newlines
fn text_field(value: &Value, key: &str) -> Option<String> {
    let text = match value.get(key)? {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Missing fields fall back to catalog data
pub fn parse_analysis(value: &Value, exercise: &Exercise) -> Analysis {
    Analysis {
        execution: text_field(value, "execution").unwrap_or_else(|| exercise.instructions.to_string()),
        muscles: text_field(value, "muscles").unwrap_or_else(|| exercise.muscle.label().to_string()),
        tip: text_field(value, "tip").unwrap_or_else(|| DEFAULT_TIP.to_string()),
    }
}

/// Keep video-host links only, at most [`MAX_VIDEOS`]
pub fn filter_videos(citations: &[Citation]) -> Vec<VideoRef> {
    citations
        .iter()
        .map(|c| VideoRef {
            title: c.title.clone().unwrap_or_else(|| DEFAULT_VIDEO_TITLE.to_string()),
            uri: c.uri.clone().unwrap_or_default(),
        })
        .filter(|v| VIDEO_DOMAINS.iter().any(|d| v.uri.contains(d)))
        .take(MAX_VIDEOS)
        .collect()
}

pub async fn fetch_image(service: &dyn GenerativeService, exercise: &Exercise) -> Panel<GeneratedImage> {
    match service.generate_image(&image_prompt(exercise), IMAGE_ASPECT_RATIO).await {
        Ok(image) => Panel::Ready(image),
        Err(e) => {
            error!(exercise = exercise.id, error = %e, "anatomy image failed");
            Panel::Failed(PANEL_ERROR.to_string())
        }
    }
}

pub async fn fetch_analysis(service: &dyn GenerativeService, exercise: &Exercise) -> Panel<Analysis> {
    match service.generate_json(&analysis_prompt(exercise), Some(&analysis_schema())).await {
        Ok(value) => Panel::Ready(parse_analysis(&value, exercise)),
        Err(e) => {
            error!(exercise = exercise.id, error = %e, "biomechanics analysis failed");
            Panel::Failed(PANEL_ERROR.to_string())
        }
    }
}

pub async fn fetch_videos(service: &dyn GenerativeService, exercise: &Exercise) -> Panel<Vec<VideoRef>> {
    match service.search_grounded(&video_prompt(exercise)).await {
        Ok(answer) => Panel::Ready(filter_videos(&answer.citations)),
        Err(e) => {
            error!(exercise = exercise.id, error = %e, "video search failed");
            Panel::Failed(PANEL_ERROR.to_string())
        }
    }
}

/// Run all three requests concurrently and wait for every panel
pub async fn load_detail(service: &dyn GenerativeService, exercise: &'static Exercise) -> ExerciseDetail {
    info!(exercise = exercise.id, "loading exercise detail");
    let (image, analysis, videos) = tokio::join!(
        fetch_image(service, exercise),
        fetch_analysis(service, exercise),
        fetch_videos(service, exercise),
    );
    ExerciseDetail {
        exercise,
        image,
        analysis,
        videos,
    }
}

/// Spawn the three requests and deliver each result as it lands.
///
/// Dropping the receiver discards whatever is still in flight.
pub fn stream_detail(service: Arc<dyn GenerativeService>, exercise: &'static Exercise) -> mpsc::Receiver<DetailUpdate> {
    let (tx, rx) = mpsc::channel(3);

    let (svc, out) = (service.clone(), tx.clone());
    tokio::spawn(async move {
        let panel = fetch_image(svc.as_ref(), exercise).await;
        let _ = out.send(DetailUpdate::Image(panel)).await;
    });

    let (svc, out) = (service.clone(), tx.clone());
    tokio::spawn(async move {
        let panel = fetch_analysis(svc.as_ref(), exercise).await;
        let _ = out.send(DetailUpdate::Analysis(panel)).await;
    });

    tokio::spawn(async move {
        let panel = fetch_videos(service.as_ref(), exercise).await;
        let _ = tx.send(DetailUpdate::Videos(panel)).await;
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedService;
    use crate::ai::GroundedAnswer;
    use crate::exercises::find_exercise;
    use serde_json::json;

    fn citation(title: Option<&str>, uri: &str) -> Citation {
        Citation {
            title: title.map(str::to_string),
            uri: Some(uri.to_string()),
        }
    }

    fn image() -> GeneratedImage {
        GeneratedImage {
            mime_type: "image/png".into(),
            aspect_ratio: IMAGE_ASPECT_RATIO.into(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_image_prompt_names_exercise_and_muscle() {
        let ex = find_exercise("gm1").unwrap();
        let prompt = image_prompt(ex);
        assert!(prompt.contains("Hip Thrust (Elevação Pélvica)"));
        assert!(prompt.contains("the Glúteo muscles"));
    }

    #[test]
    fn test_filter_videos_keeps_hosts_and_caps() {
        let citations = vec![
            citation(Some("Blog"), "https://example.com/supino"),
            citation(Some("A"), "https://www.youtube.com/watch?v=a"),
            citation(None, "https://youtu.be/b"),
            citation(Some("C"), "https://m.youtube.com/watch?v=c"),
            citation(Some("D"), "https://youtube.com/watch?v=d"),
        ];
        let videos = filter_videos(&citations);
        assert_eq!(videos.len(), MAX_VIDEOS);
        assert_eq!(videos[0].title, "A");
        assert_eq!(videos[1].title, DEFAULT_VIDEO_TITLE);
        assert_eq!(videos[2].uri, "https://m.youtube.com/watch?v=c");
    }

    #[test]
    fn test_filter_videos_drops_missing_uri() {
        let citations = vec![Citation { title: Some("x".into()), uri: None }];
        assert!(filter_videos(&citations).is_empty());
    }

    #[test]
    fn test_parse_analysis_accepts_step_list() {
        let ex = find_exercise("q1").unwrap();
        let value = json!({ "execution": ["Desça", "Pause", "Suba"], "muscles": "Quadríceps, glúteos", "tip": "Joelhos alinhados" });
        let analysis = parse_analysis(&value, ex);
        assert_eq!(analysis.execution, "Desça\nPause\nSuba");
        assert_eq!(analysis.muscles, "Quadríceps, glúteos");
        assert_eq!(analysis.tip, "Joelhos alinhados");
    }

    #[test]
    fn test_parse_analysis_falls_back_to_catalog() {
        let ex = find_exercise("q1").unwrap();
        let analysis = parse_analysis(&json!({}), ex);
        assert_eq!(analysis.execution, ex.instructions);
        assert_eq!(analysis.muscles, "Quadríceps");
        assert_eq!(analysis.tip, DEFAULT_TIP);
    }

    #[test]
    fn test_search_url_is_encoded() {
        let detail = ExerciseDetail::new(find_exercise("q2").unwrap());
        let url = detail.search_url();
        assert!(url.starts_with("https://www.youtube.com/results?search_query="));
        assert!(!url.contains(' '));
    }

    #[tokio::test]
    async fn test_load_detail_all_ready() {
        let service = ScriptedService {
            image: Some(image()),
            json: Some(json!({ "execution": "a", "muscles": "b", "tip": "c" })),
            grounded: Some(GroundedAnswer {
                text: String::new(),
                citations: vec![citation(Some("V"), "https://youtu.be/v")],
            }),
            ..Default::default()
        };
        let detail = load_detail(&service, find_exercise("p1").unwrap()).await;
        assert!(detail.is_complete());
        assert_eq!(detail.image.ready().unwrap().data, vec![1, 2, 3]);
        assert_eq!(detail.analysis.ready().unwrap().tip, "c");
        assert_eq!(detail.videos.ready().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let service = ScriptedService {
            json: Some(json!({ "tip": "c" })),
            ..Default::default()
        };
        let detail = load_detail(&service, find_exercise("p1").unwrap()).await;
        assert!(matches!(detail.image, Panel::Failed(_)));
        assert!(matches!(detail.videos, Panel::Failed(_)));
        assert_eq!(detail.analysis.ready().unwrap().tip, "c");
    }

    #[tokio::test]
    async fn test_stream_detail_delivers_each_panel() {
        let service: Arc<dyn GenerativeService> = Arc::new(ScriptedService {
            image: Some(image()),
            ..Default::default()
        });
        let mut detail = ExerciseDetail::new(find_exercise("b1").unwrap());
        let mut rx = stream_detail(service, detail.exercise);
        while let Some(update) = rx.recv().await {
            detail.apply(update);
        }
        assert!(detail.is_complete());
        assert!(detail.image.ready().is_some());
        assert!(matches!(detail.analysis, Panel::Failed(_)));
        assert!(matches!(detail.videos, Panel::Failed(_)));
    }
}
