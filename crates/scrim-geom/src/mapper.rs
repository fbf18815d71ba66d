// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Design-space → page-space mapping.
//!
//! Conventions:
//! - Host world space is +Y up; page space is +Y down. The flip happens in
//!   exactly one place ([`anchor_point`]).
//! - Under [`FitPolicy::Cover`] the rendered area is the whole displayed
//!   rectangle. Under [`FitPolicy::Fit`] it is the design canvas scaled by
//!   `min(..)` and centered (letterbox / pillarbox).

use crate::{
    AnchorOrigin, DesignSize, FitPolicy, GeometryError, ObjectTransform, OverlayRect, ScreenRect,
    ViewportSnapshot,
};

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn check(snapshot: &ViewportSnapshot) -> Result<(), GeometryError> {
    let DesignSize { width, height } = snapshot.design;
    if !positive(width) || !positive(height) {
        return Err(GeometryError::Degenerate("design size must be positive"));
    }
    let d = &snapshot.displayed;
    if !positive(d.width) || !positive(d.height) || !d.left.is_finite() || !d.top.is_finite() {
        return Err(GeometryError::Degenerate("displayed rect must be finite and non-empty"));
    }
    Ok(())
}

/// Area of the displayed rectangle the host actually renders into.
pub fn rendered_rect(
    snapshot: &ViewportSnapshot,
    fit: FitPolicy,
) -> Result<ScreenRect, GeometryError> {
    check(snapshot)?;
    let displayed = snapshot.displayed;
    match fit {
        FitPolicy::Cover => Ok(displayed),
        FitPolicy::Fit => {
            let design = snapshot.design;
            let s = (displayed.width / design.width).min(displayed.height / design.height);
            let width = design.width * s;
            let height = design.height * s;
            Ok(ScreenRect::new(
                displayed.left + (displayed.width - width) / 2.0,
                displayed.top + (displayed.height - height) / 2.0,
                width,
                height,
            ))
        }
    }
}

/// Design-unit → page-pixel scale for `fit`.
///
/// Cover takes the larger axis ratio of the displayed rectangle. Fit first
/// letterboxes, then takes the larger axis ratio of the letterboxed area
/// (which collapses to the smaller ratio of the displayed rectangle).
pub fn scale_for(snapshot: &ViewportSnapshot, fit: FitPolicy) -> Result<f64, GeometryError> {
    let rendered = rendered_rect(snapshot, fit)?;
    let design = snapshot.design;
    Ok((rendered.width / design.width).max(rendered.height / design.height))
}

/// Page position of world (0, 0) plus the flip that turns world +Y into page -Y.
///
/// The bottom-left corner is taken from the scaled design canvas, not the
/// rendered rect: under Cover the canvas overflows the displayed rect and is
/// cropped evenly on both sides.
fn anchor_point(
    rendered: &ScreenRect,
    design: DesignSize,
    transform: &ObjectTransform,
    scale: f64,
    origin: AnchorOrigin,
) -> (f64, f64) {
    let (ox, oy) = match origin {
        AnchorOrigin::Center => (rendered.center_x(), rendered.center_y()),
        AnchorOrigin::BottomLeft => (
            rendered.center_x() - design.width * scale / 2.0,
            rendered.center_y() + design.height * scale / 2.0,
        ),
    };
    (ox + transform.world_x * scale, oy - transform.world_y * scale)
}

/// Maps one host object onto the page.
///
/// The result is centered on the object's world position and sized by the
/// object's declared size times the policy scale.
pub fn compute_overlay_rect(
    snapshot: &ViewportSnapshot,
    transform: &ObjectTransform,
    fit: FitPolicy,
    origin: AnchorOrigin,
) -> Result<OverlayRect, GeometryError> {
    let finite = [transform.world_x, transform.world_y, transform.width, transform.height]
        .iter()
        .all(|v| v.is_finite());
    if !finite || transform.width < 0.0 || transform.height < 0.0 {
        return Err(GeometryError::Degenerate("object transform must be finite"));
    }

    let rendered = rendered_rect(snapshot, fit)?;
    let scale = scale_for(snapshot, fit)?;
    let width = transform.width * scale;
    let height = transform.height * scale;
    let (cx, cy) = anchor_point(&rendered, snapshot.design, transform, scale, origin);

    Ok(OverlayRect::new(cx - width / 2.0, cy - height / 2.0, width, height))
}

/// Same as [`compute_overlay_rect`] but starting from possibly-unresolved inputs.
///
/// A missing viewport or object is reported as an error value so the caller
/// can warn and skip the frame.
pub fn resolve_overlay_rect(
    snapshot: Option<ViewportSnapshot>,
    transform: Option<ObjectTransform>,
    fit: FitPolicy,
    origin: AnchorOrigin,
) -> Result<OverlayRect, GeometryError> {
    let snapshot = snapshot.ok_or(GeometryError::ViewportUnavailable)?;
    let transform = transform.ok_or(GeometryError::ObjectUnavailable)?;
    compute_overlay_rect(&snapshot, &transform, fit, origin)
}
