use rand::Rng;

/// Returns a uniformly shuffled copy of `items`, leaving the input untouched.
#[must_use]
pub fn shuffle<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_with(items, &mut rand::rng())
}

/// Fisher-Yates over a copy of `items` using the caller's generator.
#[must_use]
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn keeps_every_element_exactly_once() {
        let items: Vec<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let mut shuffled = shuffle_with(&items, &mut rng);
        assert_eq!(shuffled.len(), items.len());
        shuffled.sort_unstable();
        assert_eq!(shuffled, items);
    }

    #[test]
    fn input_is_not_mutated() {
        let items = vec!["a", "b", "c", "d"];
        let _ = shuffle(&items);
        assert_eq!(items, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let items: Vec<u32> = (0..10).collect();
        let a = shuffle_with(&items, &mut StdRng::seed_from_u64(42));
        let b = shuffle_with(&items, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn handles_empty_and_single() {
        let empty: Vec<u8> = Vec::new();
        assert!(shuffle(&empty).is_empty());
        assert_eq!(shuffle(&[9]), vec![9]);
    }
}
