//! Built-in sample flow: name, shoe size and address.
//!
//! Used by the binary when no schema file is configured.

use crate::domain::dialog::{dialog_set_from_yaml, DialogError, DialogSet};

/// Id of the flow's presentation dialog.
pub const PROFILE_ROOT_DIALOG: &str = "root";

pub const PROFILE_FLOW_YAML: &str = r#"
prompts:
  - id: text
    kind: text
  - id: shoesize
    kind: number
    retry_prompt: Please enter a size between 0 and 16. Half sizes are acceptable.
    range: { min: 0, max: 16, step: 0.5 }

slot_sets:
  - id: fullname
    slots:
      - name: first
        filler: text
        prompt: Please enter your first name.
      - name: last
        filler: text
        prompt: Please enter your last name.

  - id: address
    slots:
      - name: street
        filler: text
        prompt: Please enter your street address.
      - name: city
        filler: text
        prompt: Please enter the city.
      - name: zip
        filler: text
        prompt: Please enter the zip.

  - id: profile
    slots:
      - name: fullname
        filler: fullname
      - name: shoesize
        filler: shoesize
        prompt: Please enter your shoe size.
      - name: address
        filler: address

presentations:
  - id: root
    slot_set: profile
    templates:
      fullname: "Your name is {first} {last}."
      shoesize: "You wear a size {shoesize} shoe."
      address: "Your address is: {street}, {city} {zip}"
"#;

/// Builds the sample flow.
///
/// # Errors
///
/// Only fails if the embedded definition is broken.
pub fn profile_dialog_set() -> Result<DialogSet, DialogError> {
    dialog_set_from_yaml(PROFILE_FLOW_YAML)
}
