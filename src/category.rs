use std::fmt;

pub const CLASSIFICATION_NOTE: &str = "Classification based on weight classes similar to the \
     CBJJ/IBJJF table (maximum weight per category, with gi). \
     Always check the specific tournament rules.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    /// Only `M` and `F` are recognised, in either case.
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "M" => Sex::Male,
            "F" => Sex::Female,
            _ => Sex::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBracket {
    ChildrenJuvenile1,
    Juvenile2,
    Adult,
    Master,
}

impl AgeBracket {
    pub fn for_age(age: u32) -> Self {
        if age < 16 {
            AgeBracket::ChildrenJuvenile1
        } else if age < 18 {
            AgeBracket::Juvenile2
        } else if age <= 29 {
            AgeBracket::Adult
        } else {
            AgeBracket::Master
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::ChildrenJuvenile1 => "Children/Juvenile-1",
            AgeBracket::Juvenile2 => "Juvenile-2",
            AgeBracket::Adult => "Adult",
            AgeBracket::Master => "Master",
        }
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightCategory {
    Rooster,
    LightFeather,
    Feather,
    Light,
    Middle,
    MiddleHeavy,
    Heavy,
    SuperHeavy,
    UltraHeavy,
    // The female table tops out with a single open class.
    SuperOrUltraHeavy,
    Undefined,
}

impl WeightCategory {
    pub fn label(&self) -> &'static str {
        match self {
            WeightCategory::Rooster => "Rooster",
            WeightCategory::LightFeather => "Light-Feather",
            WeightCategory::Feather => "Feather",
            WeightCategory::Light => "Light",
            WeightCategory::Middle => "Middle",
            WeightCategory::MiddleHeavy => "Middle-Heavy",
            WeightCategory::Heavy => "Heavy",
            WeightCategory::SuperHeavy => "Super-Heavy",
            WeightCategory::UltraHeavy => "Ultra-Heavy",
            WeightCategory::SuperOrUltraHeavy => "Super-Heavy/Ultra-Heavy",
            WeightCategory::Undefined => "Undefined",
        }
    }
}

impl fmt::Display for WeightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const MALE_LIMITS: [(f64, WeightCategory); 8] = [
    (57.5, WeightCategory::Rooster),
    (64.0, WeightCategory::LightFeather),
    (70.0, WeightCategory::Feather),
    (76.0, WeightCategory::Light),
    (82.3, WeightCategory::Middle),
    (88.3, WeightCategory::MiddleHeavy),
    (94.3, WeightCategory::Heavy),
    (100.5, WeightCategory::SuperHeavy),
];

const FEMALE_LIMITS: [(f64, WeightCategory); 7] = [
    (48.5, WeightCategory::Rooster),
    (53.5, WeightCategory::LightFeather),
    (58.5, WeightCategory::Feather),
    (64.0, WeightCategory::Light),
    (69.0, WeightCategory::Middle),
    (74.0, WeightCategory::MiddleHeavy),
    (79.3, WeightCategory::Heavy),
];

fn lookup(weight: f64, limits: &[(f64, WeightCategory)], above: WeightCategory) -> WeightCategory {
    limits
        .iter()
        .find(|(max, _)| weight <= *max)
        .map(|(_, category)| *category)
        .unwrap_or(above)
}

impl WeightCategory {
    pub fn for_weight(weight: f64, sex: Sex) -> Self {
        match sex {
            Sex::Male => lookup(weight, &MALE_LIMITS, WeightCategory::UltraHeavy),
            Sex::Female => lookup(weight, &FEMALE_LIMITS, WeightCategory::SuperOrUltraHeavy),
            Sex::Other => WeightCategory::Undefined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub age_bracket: AgeBracket,
    pub weight_category: WeightCategory,
}

/// Places a competitor by age and weight. Weight classes follow the adult gi
/// divisions of the CBJJ/IBJJF table: each class is defined by its maximum
/// weight (inclusive), checked in ascending order.
pub fn classify(age: u32, weight: f64, sex: &str) -> Classification {
    Classification {
        age_bracket: AgeBracket::for_age(age),
        weight_category: WeightCategory::for_weight(weight, Sex::parse(sex)),
    }
}
