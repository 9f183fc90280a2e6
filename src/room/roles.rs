//! 라운드 역할 배정

use super::model::{Role, Room, MIN_IMPOSTERS};
use rand::seq::SliceRandom;
use rand::Rng;

/// 이번 라운드의 임포스터 수: 최소 1명, 전원이 임포스터가 되지는 않음
pub fn desired_imposters(configured: u32, total: usize) -> usize {
    let upper = total.saturating_sub(1).max(1);
    (configured.max(MIN_IMPOSTERS) as usize).min(upper)
}

/// 모든 플레이어에게 역할과 단어를 다시 배정한다
pub fn assign_roles<R: Rng + ?Sized>(room: &mut Room, rng: &mut R, now_ms: u64) {
    let total = room.players.len();
    if total == 0 {
        return;
    }

    let imposters = desired_imposters(room.imposters, total);

    // Fisher-Yates
    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(rng);

    for (rank, &index) in order.iter().enumerate() {
        let player = &mut room.players[index];
        if rank < imposters {
            player.role = Some(Role::Imposter);
            player.word = Some(room.imposter_word.clone());
        } else {
            player.role = Some(Role::Crew);
            player.word = Some(room.main_word.clone());
        }
    }

    room.touch(now_ms);
}
