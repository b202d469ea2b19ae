/// UI components
///
/// View code split out of the application shell:
/// - Profile editor form (profile_form.rs)
/// - Preview pane (preview_pane.rs)
pub mod preview_pane;
pub mod profile_form;
