/// A titled group of static recommendation bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub title: &'static str,
    pub points: &'static [&'static str],
}

/// Business recommendations shown under the charts.  They do not depend on
/// the data or on the filters.
pub const RECOMMENDATIONS: &[Recommendation] = &[
    Recommendation {
        title: "1. Aircraft Model Selection",
        points: &[
            "Avoid high-risk aircraft like Cessna 152 and 172 due to high accident counts.",
            "Prioritize safer aircraft models with better safety records.",
            "Implement stricter maintenance & training for high-risk models.",
        ],
    },
    Recommendation {
        title: "2. Weather-Related Safety Improvements",
        points: &[
            "Strengthen pilot training for IMC (poor visibility) conditions.",
            "Invest in advanced avionics & weather radar to reduce risk.",
            "Implement stricter operational policies for bad weather flights.",
        ],
    },
    Recommendation {
        title: "3. Operational Risk Management",
        points: &[
            "Focus on improving takeoff & landing safety (most accidents happen here).",
            "Enhance maintenance & predictive analytics to prevent failures.",
            "Review & improve regulations for safety compliance.",
        ],
    },
];
