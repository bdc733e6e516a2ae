//! Static column tables, one per entity kind.
//!
//! Identifying keys (match, player, team, tournament, season ids) are not stat
//! fields and are deliberately absent here.

/// Columns of `player_match_stat`
pub const PLAYER_MATCH_FIELDS: &[&str] = &[
    "total_pass",
    "accurate_pass",
    "total_long_balls",
    "accurate_long_balls",
    "goal_assist",
    "saved_shots_from_inside_the_box",
    "saves",
    "minutes_played",
    "touches",
    "rating",
    "possession_lost_ctrl",
    "key_pass",
    "goals_prevented",
    "aerial_won",
    "duel_lost",
    "duel_won",
    "on_target_scoring_attempt",
    "goals",
    "total_clearance",
    "interception_won",
    "total_tackle",
    "was_fouled",
    "fouls",
    "expected_goals",
    "expected_assists",
    "aerial_lost",
    "challenge_lost",
    "total_cross",
    "total_contest",
    "won_contest",
    "outfielder_block",
    "big_chance_created",
    "dispossessed",
    "shot_off_target",
    "accurate_cross",
    "total_offside",
    "blocked_scoring_attempt",
    "penalty_won",
    "penalty_conceded",
    "big_chance_missed",
    "total_keeper_sweeper",
    "accurate_keeper_sweeper",
    "good_high_claim",
    "punches",
    "clearance_off_line",
    "hit_woodwork",
    "error_lead_to_a_shot",
    "own_goals",
    "last_man_tackle",
    "error_lead_to_a_goal",
    "penalty_save",
    "penalty_miss",
];

/// Columns of `player_stat` (season aggregates)
pub const PLAYER_SEASON_FIELDS: &[&str] = &[
    "accurate_long_balls",
    "accurate_long_balls_percentage",
    "accurate_passes",
    "accurate_passes_percentage",
    "aerial_duels_won",
    "assists",
    "big_chances_created",
    "big_chances_missed",
    "clean_sheet",
    "dribbled_past",
    "error_lead_to_goal",
    "expected_assists",
    "expected_goals",
    "goals",
    "goals_assists_sum",
    "goals_conceded",
    "goals_prevented",
    "interceptions",
    "key_passes",
    "minutes_played",
    "pass_to_assist",
    "penalty_faced",
    "penalty_save",
    "rating",
    "red_cards",
    "saved_shots_from_inside_the_box",
    "saves",
    "successful_dribbles",
    "tackles",
    "yellow_cards",
    "total_rating",
    "count_rating",
    "total_long_balls",
    "total_passes",
    "shots_from_inside_the_box",
    "appearances",
    "accurate_crosses",
    "accurate_crosses_percentage",
    "blocked_shots",
    "shots_on_target",
    "total_shots",
    "total_cross",
];

/// Columns of `team_match_stat`
pub const TEAM_MATCH_FIELDS: &[&str] = &[
    "ball_possession",
    "expected_goals",
    "big_chances",
    "total_shots",
    "goalkeeper_saves",
    "corner_kicks",
    "fouls",
    "passes",
    "tackles",
    "free_kicks",
    "yellow_cards",
    "red_cards",
    "shots_on_target",
    "hit_woodwork",
    "shots_off_target",
    "blocked_shots",
    "shots_inside_box",
    "shots_outside_box",
    "big_chances_scored",
    "big_chances_missed",
    "through_balls",
    "touches_in_penalty_area",
    "fouled_in_final_third",
    "offsides",
    "accurate_passes",
    "throw_ins",
    "final_third_entries",
    "final_third_phase",
    "long_balls",
    "crosses",
    "duels",
    "dispossessed",
    "ground_duels",
    "aerial_duels",
    "dribbles",
    "tackles_won",
    "total_tackles",
    "interceptions",
    "recoveries",
    "clearances",
    "total_saves",
    "goals_prevented",
    "goal_kicks",
    "big_saves",
    "high_claims",
    "punches",
    "errors_lead_to_a_shot",
    "errors_lead_to_a_goal",
    "penalty_saves",
];

/// Columns of `team_stat` (season aggregates)
pub const TEAM_SEASON_FIELDS: &[&str] = &[
    "goals_scored",
    "goals_conceded",
    "own_goals",
    "assists",
    "shots",
    "penalty_goals",
    "penalties_taken",
    "free_kick_goals",
    "free_kick_shots",
    "goals_from_inside_the_box",
    "goals_from_outside_the_box",
    "shots_from_inside_the_box",
    "shots_from_outside_the_box",
    "headed_goals",
    "left_foot_goals",
    "right_foot_goals",
    "big_chances",
    "big_chances_created",
    "big_chances_missed",
    "shots_on_target",
    "shots_off_target",
    "blocked_scoring_attempt",
    "successful_dribbles",
    "dribble_attempts",
    "corners",
    "hit_woodwork",
    "fast_breaks",
    "fast_break_goals",
    "fast_break_shots",
    "average_ball_possession",
    "total_passes",
    "accurate_passes",
    "accurate_passes_percentage",
    "total_own_half_passes",
    "accurate_own_half_passes",
    "accurate_own_half_passes_percentage",
    "total_opposition_half_passes",
    "accurate_opposition_half_passes",
    "accurate_opposition_half_passes_percentage",
    "total_long_balls",
    "accurate_long_balls",
    "accurate_long_balls_percentage",
    "total_crosses",
    "accurate_crosses",
    "accurate_crosses_percentage",
    "clean_sheets",
    "tackles",
    "interceptions",
    "saves",
    "errors_leading_to_goal",
    "errors_leading_to_shot",
    "penalties_committed",
    "penalty_goals_conceded",
    "clearances",
    "clearances_off_line",
    "last_man_tackles",
    "total_duels",
    "duels_won",
    "duels_won_percentage",
    "total_ground_duels",
    "ground_duels_won",
    "ground_duels_won_percentage",
    "total_aerial_duels",
    "aerial_duels_won",
    "aerial_duels_won_percentage",
    "possession_lost",
    "offsides",
    "fouls",
    "yellow_cards",
    "yellow_red_cards",
    "red_cards",
    "accurate_final_third_passes_against",
    "accurate_opposition_half_passes_against",
    "accurate_own_half_passes_against",
    "accurate_passes_against",
    "big_chances_against",
    "big_chances_created_against",
    "big_chances_missed_against",
    "clearances_against",
    "corners_against",
    "crosses_successful_against",
    "crosses_total_against",
    "dribble_attempts_total_against",
    "dribble_attempts_won_against",
    "errors_leading_to_goal_against",
    "errors_leading_to_shot_against",
    "hit_woodwork_against",
    "interceptions_against",
    "key_passes_against",
    "long_balls_successful_against",
];
