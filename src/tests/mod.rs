mod test_dispatch;
mod test_networks;
mod test_rate_tree;
