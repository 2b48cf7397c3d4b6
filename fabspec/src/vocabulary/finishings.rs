//! Finishing / post-treatment codes

/// (code, description)
pub(crate) const FINISHING_TABLE: [(&str, &str); 15] = [
    ("PD", "Plain Dyed"),
    ("YD", "Yarn Dyed"),
    ("PT", "Printed"),
    ("WR", "Water Repellent"),
    ("DWR", "Durable Water Repellent"),
    ("WP", "Waterproof"),
    ("PU", "PU Coating"),
    ("CIRE", "Cire"),
    ("CAL", "Calendered"),
    ("AB", "Anti-Bacterial"),
    ("UV", "UV Protection"),
    ("PEACH", "Peach Finish"),
    ("BRUSH", "Brushed"),
    ("WASH", "Washed"),
    ("LAM", "Laminated"),
];
