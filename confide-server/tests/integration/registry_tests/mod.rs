mod test_capacity;
mod test_membership_events;
mod test_relay;
