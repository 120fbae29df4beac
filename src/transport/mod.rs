//! Transport layer: wire-format details of the provider's Graph-style API.

mod create_template;
mod graph;
mod list_templates;

pub use create_template::{decode_create_template_response, encode_create_template_body};
pub use graph::{
    GraphApiError, TransportError, decode_delete_template_response, decode_error_envelope,
};
pub use list_templates::{TemplateListPage, decode_list_templates_response};
