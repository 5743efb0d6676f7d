/// Fixed label → ordinal table for the store's review summaries.
pub const REVIEW_SCORES: [(&str, u8); 10] = [
    ("Extremamente positivas", 10),
    ("Muito positivas", 9),
    ("Positivas", 8),
    ("Ligeiramente positivas", 7),
    ("Análises Variadas", 6),
    ("Ligeiramente negativas", 5),
    ("Negativas", 4),
    ("Muito negativas", 3),
    ("Extremamente negativas", 2),
    ("Sem avaliação", 0),
];

/// Ordinal score for a review label. Unknown labels score 0.
pub fn review_score(label: &str) -> u8 {
    REVIEW_SCORES
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, score)| *score)
        .unwrap_or(0)
}
