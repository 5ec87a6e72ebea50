use crate::core::models::system::AtomicSystem;
use crate::engine::config::{ContactsConfig, EvaluatorConfig};
use crate::engine::contacts::{AtomSet, Contact, contact_masks, find_contacts_with};
use crate::engine::error::SelectionError;
use crate::engine::evaluator::Evaluator;
use crate::engine::mask::Mask;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct ContactsResult {
    pub contacts: Vec<Contact>,
    /// Atoms of the first selection that take part in a contact.
    pub first_in_contact: Mask,
    /// Atoms of the second selection (the first, in self mode) that take part in a contact.
    pub second_in_contact: Mask,
}

/// Finds contacts between two selections of `system`, or within `first`
/// when `second` is `None`. A missing `first` selects every atom.
#[instrument(skip_all, name = "contacts_workflow")]
pub fn run(
    system: &AtomicSystem,
    first: Option<&str>,
    second: Option<&str>,
    config: &ContactsConfig,
) -> Result<ContactsResult, SelectionError> {
    let evaluator = Evaluator::with_config(EvaluatorConfig {
        backend: config.backend,
        ..EvaluatorConfig::default()
    });

    let first_mask = match first {
        Some(expression) => evaluator.select(expression, system)?,
        None => Mask::all(system.len()),
    };
    let second_mask = second
        .map(|expression| evaluator.select(expression, system))
        .transpose()?;

    let a = AtomSet::new(system, &first_mask);
    let b = second_mask.as_ref().map(|mask| AtomSet::new(system, mask));
    info!(
        first = a.len(),
        second = b.as_ref().map_or(a.len(), AtomSet::len),
        radius = config.radius,
        "Searching for contacts."
    );

    let contacts = find_contacts_with(&a, b.as_ref(), config)?;
    let (first_in_contact, second_in_contact) = contact_masks(&contacts, &a, b.as_ref().unwrap_or(&a));

    info!("Contact search complete. Found {} pair(s).", contacts.len());
    Ok(ContactsResult {
        contacts,
        first_in_contact,
        second_in_contact,
    })
}
