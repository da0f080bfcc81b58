/*
 *  motd.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use rand::Rng;
use rand::seq::IndexedRandom;

/// Occasionally swaps the default status line for a message of the day.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageOfTheDay {
    messages: Vec<String>,
    probability: f64,
}

impl MessageOfTheDay {
    /// `probability` is clamped into `0.0..=1.0`.
    pub fn new(messages: Vec<String>, probability: f64) -> Self {
        let probability = if probability.is_nan() { 0.0 } else { probability.clamp(0.0, 1.0) };
        Self { messages, probability }
    }

    pub fn disabled() -> Self {
        Self::new(Vec::new(), 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns a message with the configured probability, otherwise `None`.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&str> {
        if self.messages.is_empty() || !rng.random_bool(self.probability) {
            return None;
        }
        self.messages.choose(rng).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn messages() -> Vec<String> {
        vec!["Have you had\nyour coffee yet?".to_string(), "Cookies are free.".to_string()]
    }

    #[test]
    fn test_never_with_zero_probability() {
        let motd = MessageOfTheDay::new(messages(), 0.0);
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..100).all(|_| motd.pick(&mut rng).is_none()));
    }

    #[test]
    fn test_always_with_full_probability() {
        let motd = MessageOfTheDay::new(messages(), 1.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = motd.pick(&mut rng).unwrap();
            assert!(messages().iter().any(|m| m == picked));
        }
    }

    #[test]
    fn test_empty_list_never_picks() {
        let motd = MessageOfTheDay::new(Vec::new(), 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(motd.pick(&mut rng), None);
        assert!(MessageOfTheDay::disabled().is_empty());
    }

    #[test]
    fn test_probability_is_clamped() {
        let motd = MessageOfTheDay::new(messages(), 7.5);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(motd.pick(&mut rng).is_some());
        let motd = MessageOfTheDay::new(messages(), f64::NAN);
        assert!(motd.pick(&mut rng).is_none());
    }

    #[test]
    fn test_low_probability_is_occasional() {
        let motd = MessageOfTheDay::new(messages(), 0.1);
        let mut rng = StdRng::seed_from_u64(42);
        let hits = (0..10_000).filter(|_| motd.pick(&mut rng).is_some()).count();
        assert!((500..1500).contains(&hits), "hits = {hits}");
    }
}
