// src/prompts.rs
use crate::models::AnalysisMode;

/// Canonical scoring criteria, in the order the model must emit them.
/// The extractor checks for exactly five entries, so any change here must be
/// mirrored in `services::extractor`.
pub const CRITERIA: [&str; 5] = [
    "Legibility",
    "EmotionalImpact",
    "FocusComposition",
    "ColorUse",
    "ContextRelevance",
];

const TITLE_FALLBACK: &str = "not provided";

/// Builds the instruction text sent alongside the thumbnail(s). Pure and
/// deterministic; every field of the required output shape is spelled out
/// because the extractor has no fallback parser.
pub fn build_analysis_prompt(
    title: Option<&str>,
    niche: &str,
    language: &str,
    mode: AnalysisMode,
) -> String {
    let title = match title {
        Some(t) if !t.trim().is_empty() => t,
        _ => TITLE_FALLBACK,
    };

    match mode {
        AnalysisMode::Single => single_prompt(title, niche, language),
        AnalysisMode::Comparison => comparison_prompt(title, niche, language),
    }
}

/// The `details` array exactly as the model must emit it, derived from
/// `CRITERIA` so prompt and validator cannot drift apart on names or order.
fn details_template(indent: &str) -> String {
    CRITERIA
        .iter()
        .map(|name| format!("{}{{\"name\": \"{}\", \"score\": 0}}", indent, name))
        .collect::<Vec<_>>()
        .join(",\n")
}

fn criteria_list() -> String {
    CRITERIA.to_vec().join(", ")
}

fn single_prompt(title: &str, niche: &str, language: &str) -> String {
    format!(
        r##"You are an expert in YouTube thumbnail optimization.

Analyze the attached thumbnail for a video.
Video title: {title}
Channel niche: {niche}

Score the thumbnail on exactly these 5 criteria, in this order:
{criteria}.
Each score is an integer from 0 to 100.

Write every text value in {language}.

Respond with ONLY a JSON object, no markdown, no commentary, exactly this shape:
{{
  "details": [
{details}
  ],
  "recommendations": ["concrete improvement", "..."],
  "suggested_titles": ["alternative title", "..."],
  "trend_analysis": "short note on current thumbnail trends in this niche",
  "color_palette": ["#RRGGBB", "#RRGGBB", "#RRGGBB", "#RRGGBB"]
}}"##,
        criteria = criteria_list(),
        details = details_template("    "),
    )
}

fn comparison_prompt(title: &str, niche: &str, language: &str) -> String {
    format!(
        r#"You are an expert in YouTube thumbnail optimization.

You will receive exactly two thumbnails for the same video, in a fixed order:
the FIRST image is "Image A", the SECOND image is "Image B".
Video title: {title}
Channel niche: {niche}

Score each image independently on exactly these 5 criteria, in this order:
{criteria}.
Each score is an integer from 0 to 100. Only after scoring both images,
declare which one would win more clicks.

Write every text value in {language}.

Respond with ONLY a JSON object, no markdown, no commentary, exactly this shape:
{{
  "version_a": {{"details": [
{details}
  ]}},
  "version_b": {{"details": [
{details}
  ]}},
  "comparison": {{"winner": "A", "justification": "why that version wins"}}
}}"#,
        criteria = criteria_list(),
        details = details_template("    "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_prompt_names_every_criterion() {
        let prompt =
            build_analysis_prompt(Some("My video"), "cooking", "english", AnalysisMode::Single);
        for criterion in CRITERIA {
            assert!(prompt.contains(criterion), "missing {}", criterion);
        }
        assert!(prompt.contains("My video"));
        assert!(prompt.contains("cooking"));
        assert!(prompt.contains("english"));
        assert!(prompt.contains("\"details\""));
        assert!(prompt.contains("\"recommendations\""));
    }

    #[test]
    fn absent_title_uses_placeholder() {
        let with_none = build_analysis_prompt(None, "gaming", "português", AnalysisMode::Single);
        let with_blank =
            build_analysis_prompt(Some("  "), "gaming", "português", AnalysisMode::Single);
        assert!(with_none.contains("not provided"));
        assert_eq!(with_none, with_blank);
    }

    #[test]
    fn comparison_prompt_fixes_image_order_and_winner_domain() {
        let prompt = build_analysis_prompt(None, "tech", "português", AnalysisMode::Comparison);
        assert!(prompt.contains("Image A"));
        assert!(prompt.contains("Image B"));
        assert!(prompt.contains("\"version_a\""));
        assert!(prompt.contains("\"version_b\""));
        assert!(prompt.contains("\"winner\""));
        assert!(prompt.contains("independently"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = build_analysis_prompt(Some("t"), "n", "l", AnalysisMode::Comparison);
        let b = build_analysis_prompt(Some("t"), "n", "l", AnalysisMode::Comparison);
        assert_eq!(a, b);
    }
}
