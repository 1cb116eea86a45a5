use phf::phf_map;
use serde::Deserialize;
use std::collections::HashMap;

/// Weather in which no type is boosted.
pub const WEATHER_EXTREME: &str = "EXTREME";

pub const SUPER_EFFECTIVE: f64 = 1.6;
pub const NOT_VERY_EFFECTIVE: f64 = 0.625;
pub const IMMUNE: f64 = 0.390625;

pub const ALL_TYPES: [&str; 18] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

static WEATHER_BOOSTS: phf::Map<&'static str, &'static str> = phf_map! {
    "grass" => "CLEAR",
    "ground" => "CLEAR",
    "fire" => "CLEAR",
    "water" => "RAINY",
    "electric" => "RAINY",
    "bug" => "RAINY",
    "normal" => "PARTLY_CLOUDY",
    "rock" => "PARTLY_CLOUDY",
    "fairy" => "CLOUDY",
    "fighting" => "CLOUDY",
    "poison" => "CLOUDY",
    "dragon" => "WINDY",
    "flying" => "WINDY",
    "psychic" => "WINDY",
    "ice" => "SNOW",
    "steel" => "SNOW",
    "dark" => "FOG",
    "ghost" => "FOG",
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeEntry {
    #[serde(default)]
    pub boosted_in: Option<String>,
    /// Defending type -> multiplier. Missing entries count as neutral.
    #[serde(default)]
    pub effectiveness: HashMap<String, f64>,
}

/// Attacking type -> effectiveness row. Keys are stored lowercase.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TypeChart {
    entries: HashMap<String, TypeEntry>,
}

impl TypeChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// The 18-type chart with the usual weather boosts.
    pub fn standard() -> Self {
        let mut chart = TypeChart::new();
        for attacking in ALL_TYPES {
            for defending in ALL_TYPES {
                let multiplier = match relation(attacking, defending) {
                    Relation::Super => SUPER_EFFECTIVE,
                    Relation::Resisted => NOT_VERY_EFFECTIVE,
                    Relation::Immune => IMMUNE,
                    Relation::Neutral => continue,
                };
                chart.set_effectiveness(attacking, defending, multiplier);
            }
            if let Some(weather) = WEATHER_BOOSTS.get(attacking) {
                chart.set_boost(attacking, weather);
            }
        }
        chart
    }

    pub fn set_effectiveness(&mut self, attacking: &str, defending: &str, multiplier: f64) {
        self.entries
            .entry(attacking.to_ascii_lowercase())
            .or_default()
            .effectiveness
            .insert(defending.to_ascii_lowercase(), multiplier);
    }

    pub fn set_boost(&mut self, attacking: &str, weather: &str) {
        self.entries
            .entry(attacking.to_ascii_lowercase())
            .or_default()
            .boosted_in = Some(weather.to_string());
    }

    pub fn effectiveness(&self, attacking: &str, defending: &str) -> f64 {
        self.entries
            .get(attacking.to_ascii_lowercase().as_str())
            .and_then(|entry| entry.effectiveness.get(defending.to_ascii_lowercase().as_str()))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn is_boosted(&self, attacking: &str, weather: &str) -> bool {
        self.entries
            .get(attacking.to_ascii_lowercase().as_str())
            .and_then(|entry| entry.boosted_in.as_deref())
            .map(|boost| boost.eq_ignore_ascii_case(weather))
            .unwrap_or(false)
    }

    /// Normalizes keys of a chart that was deserialized as-is.
    pub(crate) fn normalized(self) -> Self {
        let mut chart = TypeChart::new();
        for (attacking, entry) in self.entries {
            for (defending, multiplier) in entry.effectiveness {
                chart.set_effectiveness(&attacking, &defending, multiplier);
            }
            if let Some(weather) = entry.boosted_in {
                chart.set_boost(&attacking, &weather);
            }
        }
        chart
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Relation {
    Super,
    Neutral,
    Resisted,
    Immune,
}

fn relation(attacking: &str, defending: &str) -> Relation {
    use Relation::*;
    match attacking {
        "normal" => match defending {
            "rock" | "steel" => Resisted,
            "ghost" => Immune,
            _ => Neutral,
        },
        "fire" => match defending {
            "fire" | "water" | "rock" | "dragon" => Resisted,
            "grass" | "ice" | "bug" | "steel" => Super,
            _ => Neutral,
        },
        "water" => match defending {
            "water" | "grass" | "dragon" => Resisted,
            "fire" | "ground" | "rock" => Super,
            _ => Neutral,
        },
        "electric" => match defending {
            "electric" | "grass" | "dragon" => Resisted,
            "water" | "flying" => Super,
            "ground" => Immune,
            _ => Neutral,
        },
        "grass" => match defending {
            "fire" | "grass" | "poison" | "flying" | "bug" | "dragon" | "steel" => Resisted,
            "water" | "ground" | "rock" => Super,
            _ => Neutral,
        },
        "ice" => match defending {
            "fire" | "water" | "ice" | "steel" => Resisted,
            "grass" | "ground" | "flying" | "dragon" => Super,
            _ => Neutral,
        },
        "fighting" => match defending {
            "normal" | "ice" | "rock" | "dark" | "steel" => Super,
            "poison" | "flying" | "psychic" | "bug" | "fairy" => Resisted,
            "ghost" => Immune,
            _ => Neutral,
        },
        "poison" => match defending {
            "grass" | "fairy" => Super,
            "poison" | "ground" | "rock" | "ghost" => Resisted,
            "steel" => Immune,
            _ => Neutral,
        },
        "ground" => match defending {
            "fire" | "electric" | "poison" | "rock" | "steel" => Super,
            "grass" | "bug" => Resisted,
            "flying" => Immune,
            _ => Neutral,
        },
        "flying" => match defending {
            "grass" | "fighting" | "bug" => Super,
            "electric" | "rock" | "steel" => Resisted,
            _ => Neutral,
        },
        "psychic" => match defending {
            "fighting" | "poison" => Super,
            "psychic" | "steel" => Resisted,
            "dark" => Immune,
            _ => Neutral,
        },
        "bug" => match defending {
            "grass" | "psychic" | "dark" => Super,
            "fire" | "fighting" | "poison" | "flying" | "ghost" | "steel" | "fairy" => Resisted,
            _ => Neutral,
        },
        "rock" => match defending {
            "fire" | "ice" | "flying" | "bug" => Super,
            "fighting" | "ground" | "steel" => Resisted,
            _ => Neutral,
        },
        "ghost" => match defending {
            "ghost" | "psychic" => Super,
            "dark" => Resisted,
            "normal" => Immune,
            _ => Neutral,
        },
        "dragon" => match defending {
            "dragon" => Super,
            "steel" => Resisted,
            "fairy" => Immune,
            _ => Neutral,
        },
        "dark" => match defending {
            "psychic" | "ghost" => Super,
            "fighting" | "dark" | "fairy" => Resisted,
            _ => Neutral,
        },
        "steel" => match defending {
            "rock" | "ice" | "fairy" => Super,
            "fire" | "water" | "electric" | "steel" => Resisted,
            _ => Neutral,
        },
        "fairy" => match defending {
            "fighting" | "dragon" | "dark" => Super,
            "fire" | "poison" | "steel" => Resisted,
            _ => Neutral,
        },
        _ => Neutral,
    }
}
