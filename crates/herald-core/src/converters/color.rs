//! Color converter.

use super::{relayed_with, ConverterResult, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use serenity::all::Colour;

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x00_00_00),
    ("white", 0xFF_FF_FF),
    ("red", 0xED_42_45),
    ("green", 0x57_F2_87),
    ("blue", 0x34_98_DB),
    ("yellow", 0xFE_E7_5C),
    ("orange", 0xE6_7E_22),
    ("purple", 0x9B_59_B6),
    ("fuchsia", 0xEB_45_9E),
    ("blurple", 0x58_65_F2),
    ("gray", 0x95_A5_A6),
    ("grey", 0x95_A5_A6),
];

/// Accepts `#rrggbb`, `0xrrggbb`, a decimal value or a color name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

fn parse_color(input: &str) -> Option<u32> {
    let lower = input.to_lowercase();

    let value = if let Some(hex) = lower.strip_prefix('#').or_else(|| lower.strip_prefix("0x")) {
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some((_, value)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        *value
    } else {
        lower.parse().ok()?
    };

    (value <= 0xFF_FF_FF).then_some(value)
}

impl SingleConverter for ColorConverter {
    type Output = Colour;

    fn signature_type(&self) -> &'static str {
        "converters-color-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<Colour> {
        parse_color(input)
            .map(|value| Some(Colour::new(value)))
            .ok_or_else(|| relayed_with(ctx, "converters-color-error-invalid", &fluent_args!("value" => input)))
    }
}
