// 텍스트 오버레이 모듈 - 캔버스 위치(%) + 타임라인 시간(초)을 가진 자막

use serde::{Deserialize, Serialize};

use super::clip::ClipId;

/// 캔버스 좌표 (0~100%)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

impl CanvasPosition {
    /// 양 축 모두 [0, 100]으로 클램프
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }
}

/// NaN은 0으로 취급
pub(crate) fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    None,
    Underline,
    LineThrough,
}

/// 텍스트 스타일 (색상은 CSS 문자열 그대로 렌더러에 전달)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub color: String,
    pub border_width: f32,
    pub border_color: String,
    pub background_color: String,
    /// 0.0~1.0
    pub opacity: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 24.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            color: "#ffffff".to_string(),
            border_width: 0.0,
            border_color: "#000000".to_string(),
            background_color: "transparent".to_string(),
            opacity: 1.0,
        }
    }
}

impl TextStyle {
    /// 렌더러가 받을 수 없는 값 정리
    pub(crate) fn sanitized(mut self) -> Self {
        self.opacity = if self.opacity.is_nan() { 1.0 } else { self.opacity.clamp(0.0, 1.0) };
        self.font_size = self.font_size.max(1.0);
        self.border_width = self.border_width.max(0.0);
        self
    }
}

/// 텍스트 오버레이
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub id: ClipId,
    pub text: String,
    pub position: CanvasPosition,
    /// 캔버스 대비 % 크기
    pub width: f64,
    pub height: f64,
    /// 도(degree)
    pub rotation: f64,
    pub start_time: f64,
    pub duration: f64,
    pub style: TextStyle,
}
