use crate::SimError;
use crate::dist::DurationDistribution;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(7)
}

#[test]
fn constant_always_returns_duration() {
    let mut rng = rng();
    let mut d = DurationDistribution::constant(42);
    for _ in 0..10 {
        assert_eq!(d.sample(&mut rng), 42);
    }
}

#[test]
fn uniform_stays_in_half_open_range() {
    let mut rng = rng();
    let mut d = DurationDistribution::uniform(5, 8).unwrap();
    let mut seen = [false; 3];
    for _ in 0..1000 {
        let v = d.sample(&mut rng);
        assert!((5..8).contains(&v), "sample {v} out of range");
        seen[(v - 5) as usize] = true;
    }
    assert!(seen.iter().all(|s| *s));
}

#[test]
fn invalid_parameters_are_configuration_errors() {
    assert!(matches!(
        DurationDistribution::uniform(8, 8),
        Err(SimError::InvalidDistribution(_))
    ));
    assert!(matches!(
        DurationDistribution::exponential(0.0),
        Err(SimError::InvalidDistribution(_))
    ));
    assert!(matches!(
        DurationDistribution::exponential(f64::NAN),
        Err(SimError::InvalidDistribution(_))
    ));
    assert!(matches!(
        DurationDistribution::normal(10.0, -1.0, None, None),
        Err(SimError::InvalidDistribution(_))
    ));
    assert!(matches!(
        DurationDistribution::normal(f64::NAN, 1.0, None, None),
        Err(SimError::InvalidDistribution(_))
    ));
    assert!(matches!(
        DurationDistribution::normal(10.0, f64::INFINITY, None, None),
        Err(SimError::InvalidDistribution(_))
    ));
    assert!(matches!(
        DurationDistribution::normal(10.0, 1.0, Some(5), Some(4)),
        Err(SimError::InvalidDistribution(_))
    ));
    assert!(matches!(
        DurationDistribution::empirical(Vec::new(), false),
        Err(SimError::InvalidDistribution(_))
    ));
}

#[test]
fn exponential_mean_matches_rate() {
    let mut rng = rng();
    let mut d = DurationDistribution::exponential(0.01).unwrap();
    let n = 20_000;
    let total: u64 = (0..n).map(|_| d.sample(&mut rng)).sum();
    let mean = total as f64 / n as f64;
    assert!((mean - 100.0).abs() < 5.0, "mean {mean}");
}

#[test]
fn normal_is_clamped_to_bounds() {
    let mut rng = rng();
    let mut d = DurationDistribution::normal(50.0, 30.0, Some(40), Some(60)).unwrap();
    for _ in 0..1000 {
        let v = d.sample(&mut rng);
        assert!((40..=60).contains(&v), "sample {v} out of bounds");
    }
}

#[test]
fn normal_never_goes_negative() {
    let mut rng = rng();
    let mut d = DurationDistribution::normal(-100.0, 1.0, None, None).unwrap();
    for _ in 0..100 {
        assert_eq!(d.sample(&mut rng), 0);
    }
}

#[test]
fn empirical_replay_cycles_in_order() {
    let mut rng = rng();
    let mut d = DurationDistribution::empirical(vec![3, 5, 7], false).unwrap();
    let got: Vec<u64> = (0..7).map(|_| d.sample(&mut rng)).collect();
    assert_eq!(got, vec![3, 5, 7, 3, 5, 7, 3]);
}

#[test]
fn empirical_copies_keep_separate_cursors() {
    let mut rng = rng();
    let mut a = DurationDistribution::empirical(vec![1, 2, 3], false).unwrap();
    assert_eq!(a.sample(&mut rng), 1);
    let mut b = a.clone();
    assert_eq!(a.sample(&mut rng), 2);
    assert_eq!(a.sample(&mut rng), 3);
    assert_eq!(b.sample(&mut rng), 2);
}

#[test]
fn empirical_random_picks_only_given_values() {
    let mut rng = rng();
    let mut d = DurationDistribution::empirical(vec![4, 9], true).unwrap();
    let samples: Vec<u64> = (0..200).map(|_| d.sample(&mut rng)).collect();
    assert!(samples.iter().all(|v| *v == 4 || *v == 9));
    assert!(samples.contains(&4));
    assert!(samples.contains(&9));
}
