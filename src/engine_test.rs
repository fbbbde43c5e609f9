#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::AnnotationTool;
use crate::geometry::Renderable;
use crate::session::{EditStatus, Indicator};

// =============================================================
// Helpers
// =============================================================

struct Sampler;

impl ColorSampler for Sampler {
    fn is_available(&self) -> bool {
        true
    }
}

fn init_tracing() {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
}

/// Engine with a 1000x1000 image rendered at half size at the origin.
fn engine() -> EngineCore {
    init_tracing();
    let mut core = EngineCore::default();
    core.set_layout(Size::new(1000.0, 1000.0), Rect::new(0.0, 0.0, 500.0, 500.0));
    core
}

fn finding(area: Rect) -> Finding {
    Finding { id: Uuid::new_v4(), area: Some(area), title: Some("Misaligned logo".into()), description: None, color: None }
}

/// Engine with one finding at natural (100,100,100,100), i.e. display (50,50,50,50).
fn engine_with_finding() -> (EngineCore, EntityId) {
    let mut core = engine();
    let f = finding(Rect::new(100.0, 100.0, 100.0, 100.0));
    let id = f.id;
    core.set_findings(vec![f]);
    (core, id)
}

fn down(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_down(Point::new(x, y), Button::Primary, Modifiers::default())
}

fn mv(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_move(Point::new(x, y), Modifiers::default())
}

fn up(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_up(Point::new(x, y), Button::Primary, Modifiers::default())
}

fn key(core: &mut EngineCore, name: &str) -> Vec<Action> {
    core.on_key_down(&Key::new(name), Modifiers::default())
}

fn created(actions: &[Action]) -> Option<&Annotation> {
    actions.iter().find_map(|a| match a {
        Action::CreateAnnotation(annotation) => Some(annotation),
        _ => None,
    })
}

fn saves(actions: &[Action]) -> Vec<(EntityId, Rect)> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::SaveArea { finding_id, rect } => Some((*finding_id, *rect)),
            _ => None,
        })
        .collect()
}

// =============================================================
// Creation gesture
// =============================================================

#[test]
fn rect_drag_emits_create_in_natural_space() {
    let mut core = engine();
    core.set_tool(Tool::Rect);
    down(&mut core, 10.0, 10.0);
    assert!(core.preview().is_some());
    mv(&mut core, 60.0, 40.0);
    let actions = up(&mut core, 60.0, 40.0);

    let Some(annotation) = created(&actions) else { panic!("expected create") };
    assert_eq!(annotation.tool, AnnotationTool::Rect);
    assert_eq!(annotation.rect, Some(Rect::new(20.0, 20.0, 100.0, 60.0)));
    assert_eq!(annotation.color.as_deref(), Some(core.tools.color()));
    assert!(core.doc.is_empty());
    assert_eq!(core.pending_creates(), 1);
    assert!(core.tools.start_pos().is_none());

    let items = core.render();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, EditStatus::Saving);
}

#[test]
fn confirmed_create_lands_in_store() {
    let mut core = engine();
    core.set_tool(Tool::Circle);
    down(&mut core, 10.0, 10.0);
    let actions = up(&mut core, 30.0, 30.0);
    let Some(annotation) = created(&actions).cloned() else { panic!("expected create") };

    core.apply_settled(Settled::AnnotationCreated { local_id: annotation.id, result: Ok(annotation.clone()) }, 0.0);
    assert_eq!(core.pending_creates(), 0);
    assert_eq!(core.doc.get(&annotation.id), Some(&annotation));
    assert_eq!(core.render().len(), 1);
}

#[test]
fn rejected_create_stays_on_screen_until_retried() {
    let mut core = engine();
    core.set_tool(Tool::Arrow);
    down(&mut core, 10.0, 10.0);
    let actions = up(&mut core, 40.0, 10.0);
    let Some(annotation) = created(&actions).cloned() else { panic!("expected create") };

    let follow = core.apply_settled(
        Settled::AnnotationCreated { local_id: annotation.id, result: Err(PersistError::Rejected("quota".into())) },
        100.0,
    );
    assert_eq!(follow, vec![Action::RenderNeeded]);
    assert_eq!(core.pending_creates(), 1);
    assert!(core.doc.is_empty());
    let items = core.render();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, annotation.id);
    assert_eq!(items[0].status, EditStatus::Error);
    assert_eq!(items[0].indicator, Some(Indicator::Error));

    core.tick(100.0 + core.config.indicator_ms);
    assert_eq!(core.render()[0].indicator, None);
    assert_eq!(core.pending_creates(), 1);

    let retried = core.retry_annotation(annotation.id);
    assert_eq!(retried, vec![Action::CreateAnnotation(annotation.clone()), Action::RenderNeeded]);
    assert_eq!(core.render()[0].status, EditStatus::Saving);
    core.apply_settled(Settled::AnnotationCreated { local_id: annotation.id, result: Ok(annotation.clone()) }, 5000.0);
    assert_eq!(core.pending_creates(), 0);
    assert_eq!(core.doc.len(), 1);
}

#[test]
fn rejected_create_can_be_discarded() {
    let mut core = engine();
    core.set_tool(Tool::Rect);
    down(&mut core, 10.0, 10.0);
    let actions = up(&mut core, 40.0, 40.0);
    let Some(annotation) = created(&actions).cloned() else { panic!("expected create") };

    assert!(core.discard_annotation(annotation.id).is_empty());
    core.on_annotation_failed(annotation.id, &PersistError::Transport("offline".into()), 0.0);
    assert_eq!(core.discard_annotation(annotation.id), vec![Action::RenderNeeded]);
    assert_eq!(core.pending_creates(), 0);
    assert!(core.render().is_empty());
    assert!(core.retry_annotation(annotation.id).is_empty());
}

#[test]
fn search_drag_emits_crop_and_keeps_tool() {
    let mut core = engine();
    core.set_tool(Tool::Search);
    down(&mut core, 50.0, 50.0);
    let actions = up(&mut core, 10.0, 20.0);
    assert!(actions.contains(&Action::SearchRegion(Rect::new(20.0, 40.0, 80.0, 60.0))));
    assert!(created(&actions).is_none());
    assert_eq!(core.tools.tool(), Tool::Search);
    assert!(core.tools.is_search_mode());
}

#[test]
fn pen_stroke_emits_payload() {
    let mut core = engine();
    core.set_tool(Tool::Pen);
    down(&mut core, 0.0, 0.0);
    mv(&mut core, 5.0, 10.0);
    let actions = up(&mut core, 10.0, 5.0);
    let Some(annotation) = created(&actions) else { panic!("expected create") };
    assert_eq!(annotation.rect, Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
    let points = annotation.payload.as_ref().and_then(|p| p["points"].as_array()).map(Vec::len);
    assert_eq!(points, Some(3));
}

#[test]
fn tool_switch_mid_gesture_drops_it() {
    let mut core = engine();
    core.set_tool(Tool::Rect);
    down(&mut core, 10.0, 10.0);
    core.set_tool(Tool::Circle);
    assert!(core.preview().is_none());
    let actions = up(&mut core, 60.0, 60.0);
    assert!(created(&actions).is_none());
}

#[test]
fn escape_abandons_creation() {
    let mut core = engine();
    core.set_tool(Tool::Rect);
    down(&mut core, 10.0, 10.0);
    assert_eq!(key(&mut core, "Escape"), vec![Action::RenderNeeded]);
    assert!(core.preview().is_none());
    assert!(up(&mut core, 60.0, 60.0).is_empty());
}

#[test]
fn pointer_ignored_until_layout_known() {
    let mut core = EngineCore::default();
    core.set_tool(Tool::Rect);
    assert!(down(&mut core, 10.0, 10.0).is_empty());
    assert!(core.tools.start_pos().is_none());
}

#[test]
fn secondary_button_does_not_draw() {
    let mut core = engine();
    core.set_tool(Tool::Rect);
    let actions = core.on_pointer_down(Point::new(10.0, 10.0), Button::Secondary, Modifiers::default());
    assert!(actions.is_empty());
    assert!(core.tools.start_pos().is_none());
}

// =============================================================
// Color sampling
// =============================================================

#[test]
fn color_picker_without_sampler_falls_back_to_cursor() {
    let mut core = engine();
    let actions = core.set_tool(Tool::ColorPicker);
    assert!(!actions.contains(&Action::SampleColor));
    assert_eq!(core.tools.tool(), Tool::Cursor);
    assert!(!core.tools.is_color_picker_mode());
}

#[test]
fn sampled_color_becomes_current() {
    let mut core = engine().with_sampler(Box::new(Sampler));
    let actions = core.set_tool(Tool::ColorPicker);
    assert!(actions.contains(&Action::SampleColor));
    assert!(core.tools.is_color_picker_mode());

    core.on_color_sampled(Some("#00FF00".into()));
    assert_eq!(core.tools.color(), "#00FF00");
    assert_eq!(core.tools.tool(), Tool::Cursor);
}

#[test]
fn escape_dismisses_sampling() {
    let mut core = engine().with_sampler(Box::new(Sampler));
    core.set_tool(Tool::ColorPicker);
    let before = core.tools.color().to_owned();
    key(&mut core, "Escape");
    assert_eq!(core.tools.tool(), Tool::Cursor);
    assert_eq!(core.tools.color(), before);
}

// =============================================================
// Edit sessions
// =============================================================

#[test]
fn double_click_opens_session() {
    let (mut core, id) = engine_with_finding();
    assert_eq!(core.on_double_click(Point::new(75.0, 75.0)), vec![Action::RenderNeeded]);
    assert_eq!(core.sessions.status(&id), EditStatus::Editing);
    assert!(core.render()[0].show_handles);
}

#[test]
fn double_click_ignored_when_editing_disabled() {
    let mut core = engine();
    core.config.editing_enabled = false;
    let f = finding(Rect::new(100.0, 100.0, 100.0, 100.0));
    let id = f.id;
    core.set_findings(vec![f]);
    assert!(core.on_double_click(Point::new(75.0, 75.0)).is_empty());
    assert_eq!(core.sessions.status(&id), EditStatus::Idle);
}

#[test]
fn move_drag_divides_by_scale_then_click_outside_saves() {
    let (mut core, id) = engine_with_finding();
    core.on_double_click(Point::new(75.0, 75.0));

    down(&mut core, 75.0, 75.0);
    assert_eq!(core.sessions.captured(), Some(id));
    mv(&mut core, 85.0, 80.0);
    up(&mut core, 85.0, 80.0);
    assert_eq!(core.sessions.captured(), None);
    assert_eq!(core.sessions.status(&id), EditStatus::Dirty);
    assert_eq!(core.sessions.in_progress(&id), Some(Rect::new(120.0, 110.0, 100.0, 100.0)));

    let actions = down(&mut core, 400.0, 400.0);
    assert_eq!(saves(&actions), vec![(id, Rect::new(120.0, 110.0, 100.0, 100.0))]);
    assert_eq!(core.sessions.status(&id), EditStatus::Saving);
}

#[test]
fn handle_drag_resizes_with_floor() {
    let (mut core, id) = engine_with_finding();
    core.on_double_click(Point::new(75.0, 75.0));

    down(&mut core, 100.0, 100.0);
    mv(&mut core, 20.0, 20.0);
    up(&mut core, 20.0, 20.0);
    assert_eq!(core.sessions.in_progress(&id), Some(Rect::new(100.0, 100.0, 10.0, 10.0)));
}

#[test]
fn pointer_up_outside_surface_releases_capture() {
    let (mut core, id) = engine_with_finding();
    core.on_double_click(Point::new(75.0, 75.0));
    down(&mut core, 75.0, 75.0);
    up(&mut core, -500.0, 9000.0);
    assert_eq!(core.sessions.captured(), None);
    assert!(core.sessions.status(&id).is_open());
}

#[test]
fn save_success_shows_transient_indicator() {
    let (mut core, id) = engine_with_finding();
    core.begin_edit(id).ok();
    core.sessions.nudge(id, 5.0, 0.0).ok();
    let actions = core.commit(id);
    assert_eq!(saves(&actions).len(), 1);

    core.tick(1000.0);
    core.apply_settled(Settled::AreaSaved { finding_id: id, result: Ok(()) }, 1000.0);
    assert_eq!(core.sessions.status(&id), EditStatus::Idle);
    assert_eq!(core.sessions.authoritative(&id), Some(Rect::new(105.0, 100.0, 100.0, 100.0)));
    assert_eq!(core.render()[0].indicator, Some(Indicator::Saved));

    assert!(core.tick(2500.0).is_empty());
    assert_eq!(core.tick(3000.0), vec![Action::RenderNeeded]);
    assert_eq!(core.render()[0].indicator, None);
}

#[test]
fn save_failure_keeps_authoritative_and_flags_error() {
    let (mut core, id) = engine_with_finding();
    core.begin_edit(id).ok();
    core.sessions.nudge(id, 5.0, 0.0).ok();
    core.commit(id);
    core.on_save_settled(id, Err(PersistError::Transport("offline".into())), 0.0);

    assert_eq!(core.sessions.status(&id), EditStatus::Error);
    assert_eq!(core.sessions.authoritative(&id), Some(Rect::new(100.0, 100.0, 100.0, 100.0)));
    assert_eq!(core.sessions.display_rect(&id), Some(Rect::new(105.0, 100.0, 100.0, 100.0)));

    assert_eq!(core.begin_edit(id), Ok(()));
    assert_eq!(core.sessions.status(&id), EditStatus::Dirty);
    core.commit(id);
    core.on_save_settled(id, Ok(()), 0.0);
    assert_eq!(core.sessions.status(&id), EditStatus::Idle);
    assert_eq!(core.sessions.indicator(&id), Some(Indicator::Saved));
}

#[test]
fn escape_cannot_cancel_inflight_save() {
    let (mut core, id) = engine_with_finding();
    core.begin_edit(id).ok();
    core.sessions.nudge(id, 5.0, 0.0).ok();
    core.commit(id);
    assert!(key(&mut core, "Escape").is_empty());
    assert_eq!(core.sessions.status(&id), EditStatus::Saving);
    assert_eq!(core.begin_edit(id), Err(SessionError::SaveInFlight(id)));
}

#[test]
fn sessions_progress_independently() {
    let mut core = engine();
    let a = finding(Rect::new(0.0, 0.0, 50.0, 50.0));
    let b = finding(Rect::new(300.0, 300.0, 50.0, 50.0));
    let (a_id, b_id) = (a.id, b.id);
    core.set_findings(vec![a, b]);

    core.begin_edit(a_id).ok();
    core.begin_edit(b_id).ok();
    core.sessions.nudge(a_id, 1.0, 0.0).ok();
    core.sessions.nudge(b_id, 0.0, 1.0).ok();
    assert_eq!(core.sessions.status(&a_id), EditStatus::Dirty);
    assert_eq!(core.sessions.status(&b_id), EditStatus::Dirty);

    core.commit(a_id);
    core.on_save_settled(a_id, Ok(()), 0.0);
    assert_eq!(core.sessions.status(&b_id), EditStatus::Dirty);
    assert_eq!(core.sessions.in_progress(&b_id), Some(Rect::new(300.0, 301.0, 50.0, 50.0)));
}

#[test]
fn settle_before_first_tick_gets_live_indicator() {
    let (mut core, id) = engine_with_finding();
    core.begin_edit(id).ok();
    core.sessions.nudge(id, 5.0, 0.0).ok();
    core.commit(id);

    core.on_save_settled(id, Ok(()), 90_000.0);
    assert!(core.tick(90_000.0 + core.config.indicator_ms - 1.0).is_empty());
    assert_eq!(core.render()[0].indicator, Some(Indicator::Saved));
}

#[test]
fn feed_refresh_moves_settled_finding() {
    let (mut core, id) = engine_with_finding();
    core.begin_edit(id).ok();
    key(&mut core, "Escape");
    assert_eq!(core.sessions.status(&id), EditStatus::Idle);

    let mut moved = finding(Rect::new(600.0, 600.0, 100.0, 100.0));
    moved.id = id;
    core.set_findings(vec![moved]);
    assert_eq!(core.sessions.authoritative(&id), Some(Rect::new(600.0, 600.0, 100.0, 100.0)));
    assert!(matches!(
        core.render()[0].shape,
        Renderable::Box { bounds, .. } if bounds == Rect::new(300.0, 300.0, 50.0, 50.0)
    ));

    assert_eq!(core.begin_edit(id), Ok(()));
    assert_eq!(core.sessions.in_progress(&id), Some(Rect::new(600.0, 600.0, 100.0, 100.0)));
}

#[test]
fn feed_refresh_keeps_failed_edit() {
    let (mut core, id) = engine_with_finding();
    core.begin_edit(id).ok();
    core.sessions.nudge(id, 5.0, 0.0).ok();
    core.commit(id);
    core.on_save_settled(id, Err(PersistError::Transport("offline".into())), 0.0);
    core.tick(core.config.indicator_ms);

    let mut moved = finding(Rect::new(600.0, 600.0, 100.0, 100.0));
    moved.id = id;
    core.set_findings(vec![moved]);
    assert_eq!(core.sessions.display_rect(&id), Some(Rect::new(105.0, 100.0, 100.0, 100.0)));
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn keyboard_edit_nudge_and_cancel() {
    let (mut core, id) = engine_with_finding();
    assert_eq!(key(&mut core, "Tab"), vec![Action::RenderNeeded]);
    assert_eq!(core.interaction.focused(), Some(id));

    key(&mut core, "Enter");
    assert_eq!(core.sessions.status(&id), EditStatus::Editing);

    let shift = Modifiers { shift: true, ..Modifiers::default() };
    core.on_key_down(&Key::new("ArrowRight"), shift);
    key(&mut core, "ArrowDown");
    assert_eq!(core.sessions.in_progress(&id), Some(Rect::new(110.0, 101.0, 100.0, 100.0)));

    key(&mut core, "Escape");
    assert_eq!(core.sessions.status(&id), EditStatus::Idle);
    assert_eq!(core.sessions.display_rect(&id), Some(Rect::new(100.0, 100.0, 100.0, 100.0)));
}

#[test]
fn enter_on_open_session_commits() {
    let (mut core, id) = engine_with_finding();
    key(&mut core, "Tab");
    key(&mut core, "Enter");
    key(&mut core, "ArrowLeft");
    let actions = key(&mut core, "Enter");
    assert_eq!(saves(&actions), vec![(id, Rect::new(99.0, 100.0, 100.0, 100.0))]);
}

#[test]
fn tab_cycles_backwards_with_shift() {
    let mut core = engine();
    let a = finding(Rect::new(0.0, 0.0, 50.0, 50.0));
    let b = finding(Rect::new(300.0, 300.0, 50.0, 50.0));
    let (a_id, b_id) = (a.id, b.id);
    core.set_findings(vec![a, b]);
    let back = Modifiers { shift: true, ..Modifiers::default() };
    core.on_key_down(&Key::new("Tab"), back);
    assert_eq!(core.interaction.focused(), Some(b_id));
    core.on_key_down(&Key::new("Tab"), back);
    assert_eq!(core.interaction.focused(), Some(a_id));
}

// =============================================================
// Hover, cursor, click-to-scroll
// =============================================================

#[test]
fn hovering_handle_sets_resize_cursor_once() {
    let (mut core, id) = engine_with_finding();
    core.begin_edit(id).ok();
    let actions = mv(&mut core, 51.0, 51.0);
    assert!(actions.contains(&Action::SetCursor("nwse-resize".into())));
    let again = mv(&mut core, 52.0, 51.0);
    assert!(!again.iter().any(|a| matches!(a, Action::SetCursor(_))));

    let away = mv(&mut core, 400.0, 400.0);
    assert!(away.contains(&Action::SetCursor("default".into())));
}

#[test]
fn click_on_shape_scrolls_and_highlights() {
    let mut core = engine();
    let a = Annotation::new(AnnotationTool::Rect, Some(Rect::new(0.0, 0.0, 100.0, 100.0)), Some("#f00".into()));
    let id = a.id;
    core.load_annotations(vec![a]);

    let actions = down(&mut core, 25.0, 25.0);
    assert!(actions.contains(&Action::ScrollIntoView { id }));
    assert!(core.render()[0].highlighted);
    core.tick(core.config.highlight_ms);
    assert!(!core.render()[0].highlighted);
}

#[test]
fn click_on_empty_surface_does_nothing() {
    let mut core = engine();
    assert!(down(&mut core, 250.0, 250.0).is_empty());
}

// =============================================================
// Annotation edits
// =============================================================

#[test]
fn text_edit_waits_for_confirmation() {
    let mut core = engine();
    let a = Annotation::new(AnnotationTool::Rect, Some(Rect::new(0.0, 0.0, 10.0, 10.0)), Some("#f00".into()));
    let id = a.id;
    core.load_annotations(vec![a.clone()]);

    let actions = core.edit_annotation_text(id, "fix kerning".into());
    assert_eq!(
        actions,
        vec![
            Action::UpdateAnnotation { id, patch: AnnotationPatch { text: Some("fix kerning".into()), rect: None } },
            Action::RenderNeeded,
        ]
    );
    assert_eq!(core.doc.get(&id).and_then(|a| a.text.clone()), None);

    let mut stored = a;
    stored.text = Some("fix kerning".into());
    core.apply_settled(Settled::AnnotationUpdated { id, result: Ok(stored) }, 0.0);
    assert_eq!(core.doc.get(&id).and_then(|a| a.text.clone()), Some("fix kerning".into()));
    assert_eq!(core.render()[0].indicator, Some(Indicator::Saved));
}

#[test]
fn rejected_text_edit_flags_error_and_keeps_request() {
    let mut core = engine();
    let a = Annotation::new(AnnotationTool::Rect, Some(Rect::new(0.0, 0.0, 10.0, 10.0)), Some("#f00".into()));
    let id = a.id;
    core.load_annotations(vec![a]);

    core.interaction.focus(Some(id));
    core.edit_annotation_text(id, "new".into());
    assert!(core.edit_annotation_text(id, "newer".into()).is_empty());
    let follow = core.apply_settled(Settled::AnnotationUpdated { id, result: Err(PersistError::Rejected("locked".into())) }, 0.0);
    assert_eq!(follow, vec![Action::RenderNeeded]);

    let items = core.render();
    assert_eq!(items[0].status, EditStatus::Error);
    assert_eq!(items[0].indicator, Some(Indicator::Error));
    assert_eq!(items[0].tooltip.clone().and_then(|t| t.text), Some("new".into()));
    assert_eq!(core.doc.get(&id).and_then(|a| a.text.clone()), None);

    let retried = core.retry_annotation(id);
    assert_eq!(
        retried[0],
        Action::UpdateAnnotation { id, patch: AnnotationPatch { text: Some("new".into()), rect: None } }
    );
}

#[test]
fn delete_removes_after_confirmation() {
    let mut core = engine();
    let a = Annotation::new(AnnotationTool::Rect, Some(Rect::new(0.0, 0.0, 10.0, 10.0)), Some("#f00".into()));
    let id = a.id;
    core.load_annotations(vec![a]);
    core.interaction.focus(Some(id));

    assert_eq!(core.delete_annotation(id), vec![Action::DeleteAnnotation { id }, Action::RenderNeeded]);
    assert_eq!(core.doc.len(), 1);
    core.apply_settled(Settled::AnnotationDeleted { id, result: Ok(()) }, 0.0);
    assert!(core.doc.is_empty());
    assert_eq!(core.interaction.focused(), None);
}

#[test]
fn rejected_delete_keeps_annotation() {
    let mut core = engine();
    let a = Annotation::new(AnnotationTool::Rect, Some(Rect::new(0.0, 0.0, 10.0, 10.0)), Some("#f00".into()));
    let id = a.id;
    core.load_annotations(vec![a]);
    core.delete_annotation(id);
    let follow = core.apply_settled(Settled::AnnotationDeleted { id, result: Err(PersistError::NotFound(id)) }, 0.0);
    assert_eq!(follow, vec![Action::RenderNeeded]);
    assert_eq!(core.doc.len(), 1);

    let items = core.render();
    assert_eq!(items[0].status, EditStatus::Error);
    assert_eq!(items[0].indicator, Some(Indicator::Error));

    assert_eq!(core.discard_annotation(id), vec![Action::RenderNeeded]);
    assert_eq!(core.render()[0].status, EditStatus::Idle);
}

#[test]
fn edits_on_unknown_annotation_are_ignored() {
    let mut core = engine();
    assert!(core.edit_annotation_text(Uuid::new_v4(), "x".into()).is_empty());
    assert!(core.delete_annotation(Uuid::new_v4()).is_empty());
}

// =============================================================
// Visibility inputs
// =============================================================

#[test]
fn playback_time_and_solved_toggle_filter_render() {
    let mut core = engine();
    let mut timed = Annotation::new(AnnotationTool::Rect, Some(Rect::new(0.0, 0.0, 10.0, 10.0)), Some("#f00".into()));
    timed.start_at = Some(2.0);
    timed.end_at = Some(4.0);
    let mut solved = Annotation::new(AnnotationTool::Rect, Some(Rect::new(0.0, 0.0, 10.0, 10.0)), Some("#f00".into()));
    solved.solved = true;
    core.load_annotations(vec![timed, solved]);

    core.set_playback_time(Some(5.0));
    assert!(core.render().is_empty());
    core.set_playback_time(Some(3.0));
    assert_eq!(core.render().len(), 1);
    core.set_show_solved(true);
    assert_eq!(core.render().len(), 2);
}
