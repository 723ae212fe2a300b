//! Namespace schema of the notes plugin: one text entry per calendar day.

use crate::plugin::NOTES_PLUGIN_ID;
use crate::{CalendarDate, Error, PluginDataBag, Result};
use serde::{Deserialize, Serialize};

/// A dated note
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    pub text: String,
    pub note_date: CalendarDate,
}

/// All notes in the bag, in stored order
pub fn load(bag: &PluginDataBag) -> Result<Vec<NoteEntry>> {
    Ok(bag.read::<Vec<NoteEntry>>(NOTES_PLUGIN_ID)?.unwrap_or_default())
}

/// The note written for `date`, if any
pub fn note_for(bag: &PluginDataBag, date: CalendarDate) -> Result<Option<String>> {
    Ok(load(bag)?
        .into_iter()
        .find(|entry| entry.note_date == date)
        .map(|entry| entry.text))
}

/// Replace the note for `date`
///
/// Reads the current list, drops any entry for the same day and appends the
/// new one, then writes the whole list back under the notes namespace.
pub fn set_note(
    bag: &PluginDataBag,
    date: CalendarDate,
    text: &str,
    max_length: usize,
) -> Result<PluginDataBag> {
    let len = text.chars().count();
    if len > max_length {
        return Err(Error::NoteTooLong {
            len,
            max: max_length,
        });
    }

    let mut entries: Vec<NoteEntry> = load(bag)?
        .into_iter()
        .filter(|entry| entry.note_date != date)
        .collect();
    entries.push(NoteEntry {
        text: text.to_string(),
        note_date: date,
    });

    tracing::debug!("Saved note for {} ({} notes total)", date, entries.len());
    bag.write(NOTES_PLUGIN_ID, &entries)
}

/// Remove the note for `date`; the namespace stays even when emptied
pub fn clear_note(bag: &PluginDataBag, date: CalendarDate) -> Result<PluginDataBag> {
    let entries: Vec<NoteEntry> = load(bag)?
        .into_iter()
        .filter(|entry| entry.note_date != date)
        .collect();
    bag.write(NOTES_PLUGIN_ID, &entries)
}
