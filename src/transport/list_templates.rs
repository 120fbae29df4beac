use serde::Deserialize;

use crate::domain::{
    Category, ProviderButton, ProviderComponent, ProviderTemplate, ProviderTemplateId,
};
use crate::transport::graph::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One decoded page of the provider's template list.
pub struct TemplateListPage {
    pub templates: Vec<ProviderTemplate>,
    /// Cursor for the next page, when the provider reports one.
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireListResponse {
    data: Vec<WireTemplate>,
    #[serde(default)]
    paging: Option<WirePaging>,
}

#[derive(Debug, Deserialize)]
struct WirePaging {
    #[serde(default)]
    cursors: Option<WireCursors>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCursors {
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTemplate {
    name: String,
    status: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    components: Vec<WireComponent>,
}

#[derive(Debug, Deserialize)]
struct WireComponent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    buttons: Option<Vec<WireButton>>,
}

#[derive(Debug, Deserialize)]
struct WireButton {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
}

/// Decode one page of the provider's template list.
///
/// Unknown component and button types are dropped (the provider grows new
/// ones); a recognized type with its required payload missing is treated
/// as a malformed response.
pub fn decode_list_templates_response(json: &str) -> Result<TemplateListPage, TransportError> {
    let parsed: WireListResponse = serde_json::from_str(json)?;

    let templates = parsed
        .data
        .into_iter()
        .map(convert_template)
        .collect::<Result<Vec<ProviderTemplate>, TransportError>>()?;

    // `after` is present even on the final page; only a `next` link means
    // there is more to fetch.
    let next_cursor = parsed.paging.and_then(|paging| {
        paging
            .next
            .is_some()
            .then(|| paging.cursors.and_then(|cursors| cursors.after))
            .flatten()
    });

    Ok(TemplateListPage {
        templates,
        next_cursor,
    })
}

fn convert_template(wire: WireTemplate) -> Result<ProviderTemplate, TransportError> {
    if wire.name.trim().is_empty() {
        return Err(TransportError::Malformed(
            "template list entry carried a blank name",
        ));
    }

    let mut components = Vec::with_capacity(wire.components.len());
    for component in wire.components {
        if let Some(converted) = convert_component(component)? {
            components.push(converted);
        }
    }

    Ok(ProviderTemplate {
        id: wire.id.and_then(|id| ProviderTemplateId::new(id).ok()),
        name: wire.name,
        status_tag: wire.status,
        category: wire.category.as_deref().and_then(Category::from_wire_tag),
        language: wire.language,
        components,
    })
}

fn convert_component(
    wire: WireComponent,
) -> Result<Option<ProviderComponent>, TransportError> {
    let converted = match wire.kind.as_str() {
        "HEADER" => {
            // Only text headers are modeled; media headers are dropped.
            if wire.format.as_deref().is_some_and(|format| format != "TEXT") {
                return Ok(None);
            }
            let text = wire.text.ok_or(TransportError::Malformed(
                "HEADER component without text",
            ))?;
            ProviderComponent::Header { text }
        }
        "BODY" => {
            let text = wire
                .text
                .ok_or(TransportError::Malformed("BODY component without text"))?;
            ProviderComponent::Body { text }
        }
        "FOOTER" => {
            let text = wire
                .text
                .ok_or(TransportError::Malformed("FOOTER component without text"))?;
            ProviderComponent::Footer { text }
        }
        "BUTTONS" => {
            let wire_buttons = wire.buttons.ok_or(TransportError::Malformed(
                "BUTTONS component without a buttons array",
            ))?;
            let mut buttons = Vec::with_capacity(wire_buttons.len());
            for button in wire_buttons {
                if let Some(converted) = convert_button(button)? {
                    buttons.push(converted);
                }
            }
            ProviderComponent::Buttons { buttons }
        }
        _ => return Ok(None),
    };
    Ok(Some(converted))
}

fn convert_button(wire: WireButton) -> Result<Option<ProviderButton>, TransportError> {
    let converted = match wire.kind.as_str() {
        "QUICK_REPLY" => ProviderButton::QuickReply {
            text: wire
                .text
                .ok_or(TransportError::Malformed("QUICK_REPLY button without text"))?,
        },
        "URL" => ProviderButton::Url {
            text: wire
                .text
                .ok_or(TransportError::Malformed("URL button without text"))?,
            url: wire
                .url
                .ok_or(TransportError::Malformed("URL button without a url"))?,
        },
        "PHONE_NUMBER" => ProviderButton::Phone {
            text: wire.text.ok_or(TransportError::Malformed(
                "PHONE_NUMBER button without text",
            ))?,
            phone_number: wire.phone_number.ok_or(TransportError::Malformed(
                "PHONE_NUMBER button without a phone number",
            ))?,
        },
        _ => return Ok(None),
    };
    Ok(Some(converted))
}
