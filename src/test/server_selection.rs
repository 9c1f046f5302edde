use crate::model::{CohortId, Individual};
use crate::server::{FirstServer, RandomServer, ServerSelector};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn busy(id: u64) -> Option<Individual> {
    Some(Individual {
        cohort: CohortId(0),
        id,
    })
}

#[test]
fn first_server_picks_lowest_idle_index() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let servers = [busy(1), None, busy(2), None];
    assert_eq!(FirstServer.select(&servers, &mut rng), Some(1));
    assert_eq!(FirstServer.select(&[busy(1), busy(2)], &mut rng), None);
    assert_eq!(FirstServer.select(&[], &mut rng), None);
}

#[test]
fn random_server_only_picks_idle_servers() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let servers = [busy(1), None, busy(2), None];
    let mut seen = [0usize; 4];
    for _ in 0..1000 {
        let idx = RandomServer.select(&servers, &mut rng).unwrap();
        seen[idx] += 1;
    }
    assert_eq!(seen[0], 0);
    assert_eq!(seen[2], 0);
    assert!(seen[1] > 400 && seen[3] > 400, "{seen:?}");
    assert_eq!(RandomServer.select(&[busy(1)], &mut rng), None);
}
