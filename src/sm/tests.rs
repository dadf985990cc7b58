use super::*;

#[test]
fn test_first_review_of_new_card() {
    // A brand-new card (streak 0, interval 0) reviewed with the top quality
    // becomes the first repetition, due again in one day.
    let s = SM2_MOD.calc(3, 0, 250, 0);
    assert_eq!(s.repetition, 1);
    assert_eq!(s.easiness_factor, 260);
    assert_eq!(s.interval, 1);
}

#[test]
fn test_second_repetition_interval_is_six_days() {
    let s = SM2_MOD.calc(3, 1, 250, 1);
    assert_eq!(s.repetition, 2);
    assert_eq!(s.interval, 6);
}

#[test]
fn test_third_repetition_grows_by_ef() {
    let s = SM2_MOD.calc(3, 2, 250, 6);
    assert_eq!(s.repetition, 3);
    assert_eq!(s.interval, 15);
}

#[test]
fn test_interval_growth_uses_pre_update_ef() {
    // ef 250 with quality 3 becomes 260, but the interval must be computed
    // with the old value: 10 * 250 / 100 = 25, not 26.
    let s = SM2_MOD.calc(3, 5, 250, 10);
    assert_eq!(s.easiness_factor, 260);
    assert_eq!(s.interval, 25);
}

#[test]
fn test_interval_growth_rounds_half_up() {
    // 7 * 250 = 1750, 17.50 rounds up to 18 (remainder exactly 50 rounds up).
    let s = SM2_MOD.calc(2, 5, 250, 7);
    assert_eq!(s.interval, 18);

    // 7 * 240 = 1680, 16.80 rounds up to 17.
    let s = SM2_MOD.calc(2, 5, 240, 7);
    assert_eq!(s.interval, 17);

    // 7 * 220 = 1540, 15.40 rounds down to 15.
    let s = SM2_MOD.calc(2, 5, 220, 7);
    assert_eq!(s.interval, 15);
}

#[test]
fn test_low_quality_resets_streak_and_repeats_today() {
    let s = SM2_MOD.calc(0, 7, 250, 30);
    assert_eq!(s.repetition, 1);
    assert_eq!(s.interval, 0);
    assert_eq!(s.easiness_factor, 170);

    let s = SM2_MOD.calc(1, 7, 250, 30);
    assert_eq!(s.repetition, 1);
    assert_eq!(s.interval, 0);
    assert_eq!(s.easiness_factor, 220);
}

#[test]
fn test_ef_floor_is_enforced() {
    let s = SM2_MOD.calc(0, 1, 130, 1);
    assert_eq!(s.easiness_factor, 130);

    let s = SM2_MOD.calc(0, 1, 200, 1);
    assert_eq!(s.easiness_factor, 130);
}

#[test]
fn test_quality_two_keeps_streak_and_ef() {
    let s = SM2_MOD.calc(2, 3, 250, 6);
    assert_eq!(s.repetition, 4);
    assert_eq!(s.easiness_factor, 250);
    assert_eq!(s.interval, 15);
}

#[test]
fn test_strict_variant_thresholds() {
    // Quality 3 passes the modified variant but is below SM2's repeat
    // threshold (4) while at its reset threshold (3): the streak survives
    // but the card repeats today.
    let s = SM2.calc(3, 4, 250, 10);
    assert_eq!(s.repetition, 5);
    assert_eq!(s.interval, 0);
    assert_eq!(s.easiness_factor, 236);

    // Quality 2 resets the streak under SM2.
    let s = SM2.calc(2, 4, 250, 10);
    assert_eq!(s.repetition, 1);
    assert_eq!(s.interval, 0);

    // Quality 5 grows normally.
    let s = SM2.calc(5, 4, 250, 10);
    assert_eq!(s.repetition, 5);
    assert_eq!(s.interval, 25);
    assert_eq!(s.easiness_factor, 260);
}

#[test]
fn test_quality_levels() {
    assert_eq!(SM2_MOD.quality_levels(), 4);
    assert_eq!(SM2.quality_levels(), 6);
}

#[test]
#[should_panic(expected = "outside configured mapping")]
fn test_out_of_range_quality_panics() {
    SM2_MOD.calc(4, 1, 250, 1);
}

#[test]
#[should_panic(expected = "outside configured mapping")]
fn test_negative_quality_panics() {
    SM2_MOD.calc(-1, 1, 250, 1);
}

#[test]
fn test_fixed_vector_table() {
    // (quality, repetition, ef, interval) -> (repetition, ef, interval)
    let vectors = [
        ((3, 0, 250, 0), (1, 260, 1)),
        ((3, 1, 250, 1), (2, 260, 6)),
        ((3, 2, 250, 6), (3, 260, 15)),
        ((3, 3, 260, 15), (4, 270, 39)),
        ((2, 1, 250, 1), (2, 250, 6)),
        ((1, 3, 250, 6), (1, 220, 0)),
        ((0, 1, 131, 1), (1, 130, 0)),
        ((3, 5, 250, 10), (6, 260, 25)),
        ((2, 5, 250, 7), (6, 250, 18)),
    ];
    for ((q, r, ef, i), (er, eef, ei)) in vectors {
        let s = SM2_MOD.calc(q, r, ef, i);
        assert_eq!(
            (s.repetition, s.easiness_factor, s.interval),
            (er, eef, ei),
            "vector ({}, {}, {}, {})",
            q,
            r,
            ef,
            i
        );
    }
}
