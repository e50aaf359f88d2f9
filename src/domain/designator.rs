use std::{fmt, str::FromStr};

/// A token chain naming a structural path into a configuration.
///
/// Designators are split on whitespace and matched word for word; there is no
/// abbreviation or partial matching. Tokens that are exactly `no` are dropped
/// so that `no shutdown` and `shutdown` designate the same position. A
/// designator made of `no` alone keeps it, matching a line that is just `no`.
///
/// ```
/// use reconfig::Designator;
///
/// let designator = Designator::new("no ip  address");
/// assert_eq!(designator.tokens(), ["ip", "address"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Designator {
    tokens: Vec<String>,
}

impl Designator {
    /// Creates a designator from a whitespace separated string.
    #[must_use]
    pub fn new(s: &str) -> Self {
        let words: Vec<&str> = s.split_whitespace().collect();
        let tokens = if words.iter().all(|word| *word == "no") {
            words
        } else {
            words.into_iter().filter(|word| *word != "no").collect()
        };

        Self {
            tokens: tokens.into_iter().map(str::to_string).collect(),
        }
    }

    /// The tokens to match, in order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether the designator has no tokens to match.
    ///
    /// An empty designator matches the position it is applied to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<&str> for Designator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl FromStr for Designator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for Designator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}
