use rand::{seq::SliceRandom, Rng};

use crate::error::{Error, Result};

/// Vector of zeros with a single 1.0 at `index`.
pub fn one_hot(index: usize, n: usize) -> Vec<f64> {
    let mut v = vec![0.0; n];
    if index < n {
        v[index] = 1.0;
    }
    v
}

/// Shuffles `items` and splits off `round(len * test_fraction)` of them as a
/// test set. Returns `(train, test)`.
pub fn train_test_split<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    test_fraction: f64,
    rng: &mut R,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(Error::config(format!(
            "test fraction must be in [0, 1), got {test_fraction}"
        )));
    }
    items.shuffle(rng);
    let n_test = (items.len() as f64 * test_fraction).round() as usize;
    let test = items.split_off(items.len() - n_test);
    Ok((items, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn split_keeps_every_item_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let (train, test) = train_test_split((0..10).collect::<Vec<_>>(), 0.25, &mut rng).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);
        let mut all: Vec<i32> = train.into_iter().chain(test).collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn fraction_out_of_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(train_test_split(vec![1, 2], 1.0, &mut rng).is_err());
        assert!(train_test_split(vec![1, 2], -0.1, &mut rng).is_err());
    }

    #[test]
    fn one_hot_sets_single_entry() {
        assert_eq!(one_hot(2, 4), vec![0.0, 0.0, 1.0, 0.0]);
    }
}
