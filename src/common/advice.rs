/// Returned for any class the advice table does not cover.
pub const DEFAULT_ADVICE: &str = "No specific advice available for this item.";

/// Disposal advice for a detected litter category.
///
/// Total over all inputs: names outside the table map to [`DEFAULT_ADVICE`].
/// Matching is exact, including case.
pub fn resolve_advice(class_name: &str) -> &'static str {
    match class_name {
        "Aluminium foil" => "Clean and recycle if not contaminated with food.",
        "Battery" => "Do NOT throw in regular trash! Take to a battery recycling facility.",
        "Blister pack" => "Check if recyclable locally. Some pharmacies accept them.",
        "Bottle" => "Rinse and place in plastic or glass recycling bin.",
        "Bottle cap" => "Separate from the bottle and recycle in a plastic bin.",
        "Broken glass" => "Handle carefully. Wrap in newspaper and dispose of safely.",
        "Can" => "Rinse and recycle in the metal bin.",
        "Carton" => "Flatten and recycle with paper or cardboard.",
        "Cup" => "Check if recyclable; many paper cups are lined with plastic.",
        "Food waste" => "Compost if possible; otherwise dispose in organic waste.",
        "Glass jar" => "Rinse and recycle in the glass bin. Remove the lid first.",
        "Lid" => "Recycle separately based on material (plastic or metal).",
        "Other plastic" => "Check local recycling rules for mixed plastics.",
        "Paper" => "Recycle in the paper bin. Keep dry for better processing.",
        "Paper bag" => "Recycle or reuse if clean.",
        "Plastic bag & wrapper" => "Do not put in bins! Take to a grocery store drop-off.",
        "Plastic container" => "Rinse and recycle if accepted locally.",
        "Plastic gloves" => "Not recyclable. Dispose of in regular trash.",
        "Plastic utensils" => "Not recyclable in most places. Consider reusing.",
        "Pop tab" => "Recycle with metal cans or donate to charities that accept them.",
        "Rope & strings" => "Not recyclable. Dispose of safely to avoid tangling machines.",
        "Scrap metal" => "Take to a scrap yard or metal recycling facility.",
        "Shoe" => "Consider donating if in good condition. Not typically recyclable.",
        "Squeezable tube" => "Difficult to recycle. Check local facilities.",
        "Straw" => "Not recyclable. Dispose of in regular trash.",
        "Styrofoam piece" => "Not recyclable in most places. Consider reuse or special facilities.",
        "Unlabeled litter" => "Unknown material. Check with local waste management.",
        "Cigarette" => "Dispose of in a cigarette waste bin. Harmful to the environment.",
        _ => DEFAULT_ADVICE,
    }
}
