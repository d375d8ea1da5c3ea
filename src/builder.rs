//! Admin surface: form descriptors and the page builder that wires forms
//! to their elements.

use crate::element::BuilderElement;
use crate::error::{BuilderError, BuilderResult};
use crate::store::ElementStore;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;
use tracing::{debug, error};

/// Kind of admin input backing a form field.
///
/// Schema description only; rendering belongs to the host admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	/// Single-line text input
	Text,
	/// Multi-line text input
	TextArea,
	/// Rich text editor
	RichText,
	/// Numeric input
	Number,
	/// Boolean switch
	Toggle,
	/// Image picker/upload
	Image,
}

/// One editable field in a builder form.
#[derive(Debug, Clone)]
pub struct FormField {
	/// Field name within the element's data map
	pub name: String,
	/// Human-readable label
	pub label: String,
	/// Input kind
	pub kind: FieldKind,
}

impl FormField {
	/// Create a field descriptor.
	pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			label: label.into(),
			kind,
		}
	}
}

/// An admin form backed by a builder element.
///
/// The form supplies a field schema and receives/submits a flat data
/// mapping keyed by its element's key.
pub trait BuilderForm: Send + Sync {
	/// Section heading shown in the admin panel.
	fn section_name(&self) -> &str;

	/// The element this form edits.
	fn element(&self) -> &dyn BuilderElement;

	/// The form's field schema.
	fn form_schema(&self) -> Vec<FormField>;

	/// The backing element's key.
	fn key(&self) -> &str {
		self.element().key()
	}

	/// Section heading with an optional appendix.
	fn section_title(&self, append: Option<&str>) -> String {
		match append {
			Some(extra) => format!("{} {}", self.section_name(), extra),
			None => self.section_name().to_string(),
		}
	}

	/// Namespaced input name: `"{key}.{input}"`.
	fn input_name(&self, input: &str) -> String {
		format!("{}.{}", self.key(), input)
	}
}

/// An admin page assembled from builder forms.
///
/// Collects form input, hands each element its slice of the data map, and
/// fills forms back from stored data.
pub struct PageBuilder {
	store: Arc<ElementStore>,
	forms: Vec<Arc<dyn BuilderForm>>,
}

impl PageBuilder {
	/// Create a page builder over a store.
	pub fn new(store: Arc<ElementStore>) -> Self {
		Self {
			store,
			forms: Vec::new(),
		}
	}

	/// Register a form (builder style).
	pub fn with_form(mut self, form: Arc<dyn BuilderForm>) -> Self {
		self.forms.push(form);
		self
	}

	/// Register a form.
	pub fn register(&mut self, form: Arc<dyn BuilderForm>) {
		self.forms.push(form);
	}

	/// The registered forms, in registration order.
	pub fn forms(&self) -> &[Arc<dyn BuilderForm>] {
		&self.forms
	}

	/// Every form's schema, tagged with its section name.
	pub fn form_schema(&self) -> Vec<(String, Vec<FormField>)> {
		self.forms
			.iter()
			.map(|form| (form.section_name().to_string(), form.form_schema()))
			.collect()
	}

	/// Resolve the data for every registered form, keyed by element key.
	/// Elements with no stored data yield an empty object.
	///
	/// # Errors
	///
	/// Returns [`BuilderError::Misconfiguration`] when no forms are
	/// registered, or when a registered form's element has caching
	/// disabled — such a page cannot function and must fail loudly rather
	/// than silently degrade.
	pub async fn page_data(
		&self,
		page_id: Option<&str>,
	) -> BuilderResult<JsonMap<String, JsonValue>> {
		if self.forms.is_empty() {
			return Err(BuilderError::Misconfiguration(
				"at least one builder form must be registered".to_string(),
			));
		}

		let mut data = JsonMap::new();

		for form in &self.forms {
			let element = form.element();

			if !element.cache_required() {
				return Err(BuilderError::Misconfiguration(format!(
					"element `{}` has caching disabled; remove its form from the page builder",
					element.key()
				)));
			}

			let resolved = element
				.element_data(&self.store, page_id)
				.await?
				.unwrap_or_else(|| JsonValue::Object(JsonMap::new()));
			data.insert(element.key().to_string(), resolved);
		}

		Ok(data)
	}

	/// Persist a submitted data map, one entry per element key.
	///
	/// A form whose key is absent from the map is logged and skipped; the
	/// remaining elements still save.
	pub async fn save(
		&self,
		data: &JsonMap<String, JsonValue>,
		page_id: Option<&str>,
	) -> BuilderResult<()> {
		for form in &self.forms {
			let key = form.key();

			match data.get(key) {
				Some(value) => {
					debug!(element = key, "saving builder element data");
					form.element()
						.set_element_data(&self.store, value.clone(), page_id)
						.await?;
				}
				None => error!(element = key, "no data found for element"),
			}
		}

		Ok(())
	}
}
