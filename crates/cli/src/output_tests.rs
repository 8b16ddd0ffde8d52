// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn format_age_secs_picks_the_coarsest_readable_unit() {
    assert_eq!(format_age_secs(5), "5s");
    assert_eq!(format_age_secs(125), "2m");
    assert_eq!(format_age_secs(7_300), "2h");
}
