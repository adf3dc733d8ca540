mod test_signaling_exchange;
