// Protocol selection and reference mode parsing tests

use prompt2png::protocol::{Protocol, ReferenceMode};
use proptest::prelude::*;

#[test]
fn test_gemini_models_select_gemini_inline() {
    assert_eq!(
        Protocol::for_model("gemini-3-pro-image-preview"),
        Protocol::GeminiInline
    );
    assert_eq!(
        Protocol::for_model("gemini-2.5-flash-image"),
        Protocol::GeminiInline
    );
}

#[test]
fn test_marker_models_select_openai() {
    for model in ["nano-banana-pro", "DALL-E-3", "dalle-mini", "My-Nano-Banana"] {
        assert_eq!(
            Protocol::for_model(model),
            Protocol::OpenAiCompatible,
            "model {model} should select the OpenAI-compatible protocol"
        );
    }
}

#[test]
fn test_known_mode_names_parse() {
    assert_eq!(ReferenceMode::from_name("style"), ReferenceMode::Style);
    assert_eq!(
        ReferenceMode::from_name("Composition"),
        ReferenceMode::Composition
    );
    assert_eq!(ReferenceMode::from_name("ELEMENTS"), ReferenceMode::Elements);
    assert_eq!(ReferenceMode::from_name("full"), ReferenceMode::Full);
}

proptest! {
    #[test]
    fn any_model_containing_a_marker_selects_openai(
        prefix in "[a-z0-9-]{0,8}",
        suffix in "[a-z0-9-]{0,8}",
        marker_index in 0usize..3,
    ) {
        let marker = ["nano-banana", "dall-e", "dalle"][marker_index];
        let model = format!("{prefix}{marker}{suffix}");
        prop_assert_eq!(Protocol::for_model(&model), Protocol::OpenAiCompatible);
    }

    #[test]
    fn marker_detection_ignores_case(model in "(?i)(nano-banana|dall-e|dalle)") {
        prop_assert_eq!(Protocol::for_model(&model), Protocol::OpenAiCompatible);
    }

    #[test]
    fn models_without_markers_select_gemini_inline(model in "[a-z0-9.-]{1,24}") {
        let lowered = model.to_lowercase();
        prop_assume!(!lowered.contains("nano-banana"));
        prop_assume!(!lowered.contains("dall-e"));
        prop_assume!(!lowered.contains("dalle"));
        prop_assert_eq!(Protocol::for_model(&model), Protocol::GeminiInline);
    }

    #[test]
    fn unknown_mode_names_default_to_full(name in "[a-z]{1,12}") {
        prop_assume!(!["style", "composition", "elements", "full"].contains(&name.as_str()));
        prop_assert_eq!(ReferenceMode::from_name(&name), ReferenceMode::Full);
    }

    #[test]
    fn mode_names_round_trip(mode_index in 0usize..4) {
        let mode = [
            ReferenceMode::Style,
            ReferenceMode::Composition,
            ReferenceMode::Elements,
            ReferenceMode::Full,
        ][mode_index];
        prop_assert_eq!(ReferenceMode::from_name(mode.as_str()), mode);
    }
}
