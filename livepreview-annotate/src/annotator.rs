use crate::annotation::{
    InsertPosition, RenderPosition, component_annotation, element_annotation, entity_annotation,
    insert_annotation,
};
use crate::attrs::AttributeSet;
use livepreview_types::{LanguageCodename, NavigationContext, ProjectId};

/// Annotation functions bound to the current session's language and project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotator {
    language: LanguageCodename,
    project_id: Option<ProjectId>,
}

impl Annotator {
    pub fn new(language: LanguageCodename, project_id: Option<ProjectId>) -> Self {
        Self {
            language,
            project_id,
        }
    }

    /// Takes the language from the navigation context.
    pub fn from_context(ctx: &NavigationContext, project_id: Option<ProjectId>) -> Self {
        Self::new(ctx.language.clone(), project_id)
    }

    pub fn language(&self) -> &LanguageCodename {
        &self.language
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    pub fn entity(&self, item_id: Option<&str>, disable_highlight: bool) -> AttributeSet {
        entity_annotation(
            item_id,
            disable_highlight,
            Some(self.language.as_str()),
            self.project(),
        )
    }

    pub fn element(&self, element_codename: &str, disable_highlight: bool) -> AttributeSet {
        element_annotation(
            element_codename,
            disable_highlight,
            Some(self.language.as_str()),
            self.project(),
        )
    }

    pub fn component(&self, component_id: Option<&str>, disable_highlight: bool) -> AttributeSet {
        component_annotation(component_id, disable_highlight)
    }

    pub fn insert(&self, position: InsertPosition, render: Option<RenderPosition>) -> AttributeSet {
        insert_annotation(position, render)
    }

    fn project(&self) -> Option<&str> {
        self.project_id.as_ref().map(ProjectId::as_str)
    }
}
