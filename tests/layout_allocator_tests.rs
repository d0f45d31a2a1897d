use bouquet_editor::{generate_slots, BouquetError, RingSpec, SlotAllocator};
use std::collections::HashSet;
use std::f32::consts::TAU;

fn configurations() -> Vec<(Vec<RingSpec>, bool)> {
    vec![
        (vec![], false),
        (vec![], true),
        (vec![RingSpec::new(1, 0.5, 0.0, 0.0)], false),
        (vec![RingSpec::new(4, 0.1, -0.05, 15.0)], true),
        (
            vec![
                RingSpec::new(4, 0.1, -0.05, 15.0),
                RingSpec::new(8, 0.2, -0.1, 30.0),
                RingSpec::new(12, 0.3, -0.15, 45.0),
                RingSpec::new(16, 0.35, -0.2, 60.0),
            ],
            true,
        ),
        (
            vec![
                RingSpec::new(7, 2.0, 1.0, 10.0).with_offset(0.3),
                RingSpec::new(3, 4.0, -1.0, 80.0).with_offset(-1.0),
            ],
            false,
        ),
    ]
}

#[test]
fn test_slot_count_matches_configuration() {
    for (rings, include_center) in configurations() {
        let slots = generate_slots(&rings, include_center);
        let expected = usize::from(include_center) + rings.iter().map(|r| r.count).sum::<usize>();
        assert_eq!(slots.len(), expected, "rings {:?} center {}", rings, include_center);

        let unique: HashSet<usize> = slots.iter().map(|s| s.index).collect();
        assert_eq!(unique.len(), slots.len(), "slot indices must be unique");
    }
}

#[test]
fn test_ring_slots_are_evenly_spaced() {
    for (rings, include_center) in configurations() {
        let slots = generate_slots(&rings, include_center);
        let mut offset = usize::from(include_center);

        for ring in &rings {
            let ring_slots = &slots[offset..offset + ring.count];
            let step = TAU / ring.count as f32;

            for (i, slot) in ring_slots.iter().enumerate() {
                let expected_angle = ring.angular_offset + step * i as f32;
                let actual_angle = slot.position.z.atan2(slot.position.x);
                let diff = (actual_angle - expected_angle).rem_euclid(TAU);
                let diff = diff.min(TAU - diff);
                assert!(diff < 1e-4, "slot {} angle off by {}", slot.index, diff);

                let radius = (slot.position.x.powi(2) + slot.position.z.powi(2)).sqrt();
                assert!((radius - ring.radius).abs() < 1e-5);
                assert_eq!(slot.position.y, ring.y_offset);
                assert!((slot.tilt_angle - ring.tilt_degrees.to_radians()).abs() < 1e-6);
            }
            offset += ring.count;
        }
    }
}

#[test]
fn test_layout_is_deterministic() {
    let rings = [RingSpec::new(12, 0.3, -0.15, 45.0)];
    assert_eq!(generate_slots(&rings, true), generate_slots(&rings, true));
}

#[test]
fn test_release_in_any_order_restores_ascending_allocation() {
    let capacity = 9;
    let release_orders: [&[usize]; 3] = [
        &[0, 1, 2, 3, 4, 5, 6, 7, 8],
        &[8, 7, 6, 5, 4, 3, 2, 1, 0],
        &[4, 0, 8, 2, 6, 1, 7, 3, 5],
    ];

    for order in release_orders {
        let mut alloc = SlotAllocator::new(capacity);
        for expected in 0..capacity {
            assert_eq!(alloc.allocate(), Ok(expected));
        }
        assert_eq!(alloc.allocate(), Err(BouquetError::NoCapacity));

        for &slot in order {
            alloc.release(slot).unwrap();
        }
        assert_eq!(alloc.free_count(), capacity);

        let again: Vec<usize> = (0..capacity).map(|_| alloc.allocate().unwrap()).collect();
        assert_eq!(again, (0..capacity).collect::<Vec<_>>());
    }
}

#[test]
fn test_free_plus_occupied_is_capacity_after_every_operation() {
    let capacity = 41;
    let mut alloc = SlotAllocator::new(capacity);
    let mut held: Vec<usize> = Vec::new();

    // Small LCG so the operation mix is fixed between runs
    let mut state: u32 = 0x2545_f491;
    let mut next = || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        state >> 16
    };

    for step in 0..2_000 {
        match next() % 5 {
            0..=2 => match alloc.allocate() {
                Ok(slot) => {
                    assert!(!held.contains(&slot), "slot {} handed out twice", slot);
                    held.push(slot);
                }
                Err(e) => {
                    assert_eq!(e, BouquetError::NoCapacity);
                    assert_eq!(held.len(), capacity);
                }
            },
            3 if !held.is_empty() => {
                let victim = held.swap_remove(next() as usize % held.len());
                alloc.release(victim).unwrap();
                assert_eq!(alloc.release(victim), Err(BouquetError::InvalidRelease(victim)));
            }
            4 if step % 97 == 0 => {
                alloc.reset();
                held.clear();
            }
            _ => {}
        }

        assert_eq!(alloc.free_count() + alloc.occupied_count(), alloc.capacity());
        assert_eq!(alloc.occupied_count(), held.len());
        assert!(alloc.free_slots().windows(2).all(|w| w[0] < w[1]));
    }
}
