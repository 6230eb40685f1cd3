//! UI Theme - Shared colors and styling constants
//!
//! Centralized color definitions for consistent look across all panels.

use macroquad::prelude::Color;

// =============================================================================
// Base UI Colors
// =============================================================================

/// Viewport background
pub const BG_COLOR: Color = Color::new(0.11, 0.11, 0.13, 1.0);

/// Toolbar background
pub const HEADER_COLOR: Color = Color::new(0.15, 0.15, 0.18, 1.0);

/// Side panel background
pub const PANEL_COLOR: Color = Color::new(0.13, 0.13, 0.16, 1.0);

/// Status bar background
pub const STATUS_COLOR: Color = Color::new(0.09, 0.09, 0.11, 1.0);

/// Primary text color
pub const TEXT_COLOR: Color = Color::new(0.8, 0.8, 0.85, 1.0);

/// Dimmed/secondary text
pub const TEXT_DIM: Color = Color::new(0.4, 0.4, 0.45, 1.0);

/// Text on controls that cannot be used right now
pub const DISABLED_TEXT: Color = Color::new(0.28, 0.28, 0.32, 1.0);

/// Accent color (cyan)
pub const ACCENT_COLOR: Color = Color::new(0.0, 0.75, 0.9, 1.0);

// =============================================================================
// Font Sizes
// =============================================================================

/// Header/title text size
pub const FONT_SIZE_HEADER: f32 = 14.0;

/// Standard content text size
pub const FONT_SIZE_CONTENT: f32 = 12.0;

/// Small/detail text size
pub const FONT_SIZE_SMALL: f32 = 10.0;

// =============================================================================
// Slider Colors
// =============================================================================

/// Slider track background
pub const SLIDER_TRACK: Color = Color::new(0.12, 0.12, 0.14, 1.0);

/// Slider fill for values at their default
pub const SLIDER_FILL_IDLE: Color = Color::new(0.3, 0.3, 0.36, 1.0);

/// Slider fill for values moved off their default
pub const SLIDER_FILL_ACTIVE: Color = Color::new(0.0, 0.55, 0.68, 1.0);

// =============================================================================
// Tooltip Colors
// =============================================================================

/// Tooltip background
pub const TOOLTIP_BG: Color = Color::new(0.176, 0.176, 0.196, 1.0); // ~45, 45, 50

/// Tooltip border
pub const TOOLTIP_BORDER: Color = Color::new(0.314, 0.314, 0.314, 1.0); // ~80, 80, 80
