//! Instruction text sent to the image model, and the fixed status strings.
//!
//! Callers can override the instruction via
//! [`crate::config::TransformConfig::instruction`]; [`build_instruction`] is
//! used only when no override is provided.

use crate::config::StylePreference;

/// Status message shown while a transform is in flight.
pub const PROGRESS_MESSAGE: &str = "사진을 분석하고 전문가 스타일로 변환하는 중입니다...";

/// Error shown when a failure carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "이미지 처리 중 오류가 발생했습니다. 다시 시도해 주세요.";

/// Build the headshot instruction for the given style preference.
///
/// The style only adds a one-sentence lead-in to the attire requirement;
/// [`StylePreference::Unspecified`] leaves the choice of attire to the model.
pub fn build_instruction(style: StylePreference) -> String {
    let style_context = match style {
        StylePreference::Unspecified => String::new(),
        other => format!("The person is {other}. "),
    };

    format!(
        r#"Edit this photo to transform it into a high-end professional studio portrait for a resume or LinkedIn profile.

Requirements:
1. {style_context}Change the clothing to professional business attire (e.g., a well-fitted navy or dark gray suit with a crisp white shirt for men, or a professional blazer/blouse for women).
2. Change the background to a clean, solid studio backdrop (light gray, soft blue, or off-white).
3. Enhance the lighting to be soft, professional studio lighting that highlights the face naturally.
4. Maintain the person's core facial features, hairstyle, and identity accurately while cleaning up stray hairs and improving skin texture subtly.
5. The final image should look like it was taken by a professional photographer in a dedicated studio.
6. Ensure the crop is a standard professional headshot (shoulders and head)."#
    )
}
