//! Descriptor naming and the recovery of human-authored member names.

use alloc::format;
use alloc::string::String;

use crate::native::{NativeTypes, StructId, StructKind};

// -----------------------------------------------------------------------------
// Type names

/// Length of the unique identifier a code-generation pipeline appends to members.
pub const GUID_LEN: usize = 32;

// Generated names at or below this length carry no suffix worth stripping.
const MIN_GENERATED_LEN: usize = GUID_LEN + 3;

/// Returns the prefixed name a descriptor is registered under.
///
/// Actor classes get `A`, other classes and interfaces `U`, value
/// structs `F`. Other structural types keep their bare name.
pub fn metatable_name<H: NativeTypes + ?Sized>(native: &H, id: StructId) -> String {
    let name = native.struct_name(id);
    let prefix = match native.struct_kind(id) {
        StructKind::Class if native.is_actor(id) => "A",
        StructKind::Class => "U",
        StructKind::ScriptStruct => "F",
        StructKind::Struct => "",
    };
    format!("{prefix}{name}")
}

/// Strips one leading type-category sigil (`U`, `A` or `F`), if present.
///
/// # Examples
///
/// ```
/// use hb_reflect::name::strip_type_prefix;
///
/// assert_eq!(strip_type_prefix("AActor"), "Actor");
/// assert_eq!(strip_type_prefix("FVector"), "Vector");
/// assert_eq!(strip_type_prefix("Widget"), "Widget");
/// ```
pub fn strip_type_prefix(name: &str) -> &str {
    match name.as_bytes().first() {
        Some(b'U' | b'A' | b'F') => &name[1..],
        _ => name,
    }
}

// -----------------------------------------------------------------------------
// Member names

/// Recovers the human-authored name of a generated struct member.
///
/// Generated names look like `<name>_<discriminator>_<guid>`. The separator
/// and the [`GUID_LEN`]-character suffix are chopped, then everything from
/// the last remaining `_` on. Names too short to carry a suffix come back
/// unchanged.
///
/// # Examples
///
/// ```
/// use hb_reflect::name::display_name;
///
/// assert_eq!(display_name("Health_3f9a1b2c4d5e6f7a8b9c0d1e2f3a4b5c"), "Health");
/// assert_eq!(display_name("Speed_1_3f9a1b2c4d5e6f7a8b9c0d1e2f3a4b5c"), "Speed");
/// assert_eq!(display_name("Armor"), "Armor");
/// ```
pub fn display_name(generated: &str) -> &str {
    if generated.chars().count() <= MIN_GENERATED_LEN {
        return generated;
    }

    // Start of `_<guid>`, counted in characters from the end.
    let Some((cut, _)) = generated.char_indices().rev().nth(GUID_LEN) else {
        return generated;
    };
    let chopped = &generated[..cut];
    match chopped.rfind('_') {
        Some(last) => &chopped[..last],
        None => chopped,
    }
}

#[cfg(test)]
mod tests {
    use super::{display_name, metatable_name, strip_type_prefix};
    use crate::native::MemoryTypes;

    const GUID: &str = "3f9a1b2c4d5e6f7a8b9c0d1e2f3a4b5c";

    #[test]
    fn prefixes() {
        let mut types = MemoryTypes::new();
        let object = types.class("Object").finish();
        let actor = types.class("Actor").parent(object).actor().finish();
        let pawn = types.class("Pawn").parent(actor).finish();
        let vector = types.script_struct("Vector").finish();

        assert_eq!(metatable_name(&types, object), "UObject");
        assert_eq!(metatable_name(&types, actor), "AActor");
        assert_eq!(metatable_name(&types, pawn), "APawn");
        assert_eq!(metatable_name(&types, vector), "FVector");
    }

    #[test]
    fn strip_only_one_sigil() {
        assert_eq!(strip_type_prefix("UUserWidget"), "UserWidget");
        assert_eq!(strip_type_prefix(""), "");
        assert_eq!(strip_type_prefix("U"), "");
    }

    #[test]
    fn generated_names() {
        let health = alloc::format!("Health_{GUID}");
        let speed = alloc::format!("Speed_1_{GUID}");
        let max_hp = alloc::format!("Max_HP_{GUID}");

        assert_eq!(display_name(&health), "Health");
        assert_eq!(display_name(&speed), "Speed");
        // Everything after the last underscore counts as a discriminator.
        assert_eq!(display_name(&max_hp), "Max");
    }

    #[test]
    fn short_names_untouched() {
        // 35 characters: exactly at the threshold.
        let name = "ab_".repeat(11) + "xy";
        assert_eq!(name.len(), 35);
        assert_eq!(display_name(&name), name);
        assert_eq!(display_name("Speed_1"), "Speed_1");
    }
}
