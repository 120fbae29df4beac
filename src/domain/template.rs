use crate::domain::component::{Category, ComponentSet};
use crate::domain::validation::ValidationError;
use crate::domain::value::{LanguageCode, TemplateName};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A submission-ready template.
///
/// Invariant: the component set contains a body. The `(name, language)`
/// pair identifies the template toward the provider.
pub struct Template {
    name: TemplateName,
    category: Category,
    language: LanguageCode,
    components: ComponentSet,
}

impl Template {
    /// Assemble a template, checking the body-is-mandatory invariant.
    pub fn new(
        name: TemplateName,
        category: Category,
        language: LanguageCode,
        components: ComponentSet,
    ) -> Result<Self, ValidationError> {
        if components.body().is_none() {
            return Err(ValidationError::MissingBody);
        }
        Ok(Self {
            name,
            category,
            language,
            components,
        })
    }

    pub fn name(&self) -> &TemplateName {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn components(&self) -> &ComponentSet {
        &self.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::component::Component;
    use crate::domain::value::{BodyText, HeaderText};

    #[test]
    fn template_requires_a_body_component() {
        let name = TemplateName::new("order_update").unwrap();
        let language = LanguageCode::new("en").unwrap();

        let mut headers_only = ComponentSet::new();
        headers_only
            .add(Component::Header(HeaderText::new("Order news").unwrap()))
            .unwrap();

        let err = Template::new(
            name.clone(),
            Category::Utility,
            language.clone(),
            headers_only,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingBody);

        let mut with_body = ComponentSet::new();
        with_body
            .add(Component::Body(
                BodyText::new("Your order {{1}} shipped today").unwrap(),
            ))
            .unwrap();
        let template = Template::new(name, Category::Utility, language, with_body).unwrap();
        assert_eq!(
            template.components().body().map(BodyText::as_str),
            Some("Your order {{1}} shipped today")
        );
    }
}
