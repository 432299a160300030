//! Topic-specific talking points for the structure discussion

use super::state::Topic;

/// One of the three body sections of the presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Causes,
    Effects,
    Solutions,
}

impl Section {
    fn generic(self) -> &'static [&'static str] {
        match self {
            Section::Causes => &["various factors"],
            Section::Effects => &["negative impacts"],
            Section::Solutions => &["various strategies"],
        }
    }
}

fn table(topic: Topic, section: Section) -> &'static [&'static str] {
    match (topic, section) {
        (Topic::OnlineLearning, Section::Causes) => &[
            "the pandemic",
            "technology advancement",
            "cost and accessibility",
        ],
        (Topic::StressMentalHealth, Section::Causes) => &[
            "academic pressure",
            "social expectations",
            "financial worries",
        ],
        (Topic::Procrastination, Section::Causes) => &[
            "fear of failure",
            "perfectionism",
            "lack of clear goals",
        ],
        (Topic::SocialMedia, Section::Causes) => &[
            "dopamine addiction",
            "fear of missing out",
            "peer pressure",
        ],
        (Topic::GroupWork, Section::Causes) => &[
            "different learning styles",
            "scheduling conflicts",
            "varying commitment levels",
        ],
        (Topic::OnlineLearning, Section::Effects) => &[
            "more flexibility but less interaction",
            "screen fatigue",
            "self-discipline challenges",
        ],
        (Topic::StressMentalHealth, Section::Effects) => &[
            "anxiety and depression",
            "sleep problems",
            "lower academic performance",
        ],
        (Topic::Procrastination, Section::Effects) => &[
            "rushed work and lower quality",
            "increased stress",
            "missed deadlines",
        ],
        (Topic::SocialMedia, Section::Effects) => &[
            "shorter attention span",
            "less deep learning",
            "sleep deprivation",
        ],
        (Topic::GroupWork, Section::Effects) => &[
            "uneven workload distribution",
            "conflict between members",
            "coordination overhead",
        ],
        (Topic::OnlineLearning, Section::Solutions) => &[
            "create a dedicated study space",
            "use the Pomodoro technique",
            "join online study groups",
        ],
        (Topic::StressMentalHealth, Section::Solutions) => &[
            "practice mindfulness",
            "seek counseling services",
            "maintain work-life balance",
        ],
        (Topic::Procrastination, Section::Solutions) => &[
            "break tasks into smaller chunks",
            "set specific deadlines",
            "use accountability partners",
        ],
        (Topic::SocialMedia, Section::Solutions) => &[
            "use app blockers during study time",
            "schedule specific social media breaks",
            "turn off notifications",
        ],
        (Topic::GroupWork, Section::Solutions) => &[
            "establish clear roles early",
            "use project management tools",
            "have regular check-ins",
        ],
    }
}

/// Talking points for `topic_name`, in speaking order.
///
/// A topic outside the canonical five gets a single generic point.
pub fn talking_points(topic_name: &str, section: Section) -> &'static [&'static str] {
    Topic::from_name(topic_name).map_or_else(|| section.generic(), |topic| table(topic, section))
}

/// The `index`-th talking point, or `fallback` when the table runs short
pub fn talking_point(
    topic_name: &str,
    section: Section,
    index: usize,
    fallback: &'static str,
) -> &'static str {
    talking_points(topic_name, section)
        .get(index)
        .copied()
        .unwrap_or(fallback)
}

/// Upper-case the first letter for a line that opens with a talking point
pub fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_topic_has_three_points() {
        for topic in Topic::ALL {
            for section in [Section::Causes, Section::Effects, Section::Solutions] {
                assert_eq!(talking_points(topic.name(), section).len(), 3);
            }
        }
    }

    #[test]
    fn test_unknown_topic_uses_generic_points() {
        assert_eq!(
            talking_points("Climate Change", Section::Causes),
            &["various factors"]
        );
        assert_eq!(
            talking_point("Climate Change", Section::Effects, 0, "x"),
            "negative impacts"
        );
        assert_eq!(
            talking_point("Climate Change", Section::Solutions, 1, "Other methods"),
            "Other methods"
        );
    }

    #[test]
    fn test_sentence_case() {
        assert_eq!(sentence_case("screen fatigue"), "Screen fatigue");
        assert_eq!(sentence_case(""), "");
    }
}
