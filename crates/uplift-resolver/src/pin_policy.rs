use uplift_core::PinState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDecision {
    Admit,
    Reject,
}

pub fn pin_restricts(pin_state: PinState, include_pinned: bool) -> bool {
    match pin_state {
        state if state.is_hard() => true,
        PinState::UserPin => !include_pinned,
        _ => false,
    }
}

pub fn evaluate_pin(pin_state: PinState, include_pinned: bool, force: bool) -> PinDecision {
    if pin_restricts(pin_state, include_pinned) && !force {
        PinDecision::Reject
    } else {
        PinDecision::Admit
    }
}
