use cidrtag_core::{parse_ip_from_string, Error, IPv6Address, ParsedAddress, TreeV6};

fn v6(s: &str) -> IPv6Address {
    match parse_ip_from_string(s).unwrap() {
        ParsedAddress::V6(a) => a,
        ParsedAddress::V4(a) => panic!("expected IPv6, got {a}"),
    }
}

#[test]
fn longest_prefix_wins() {
    let mut tree = TreeV6::new();
    tree.add(v6("::/0"), "default").unwrap();
    tree.add(v6("2001:db8::/32"), "doc").unwrap();
    tree.add(v6("2001:db8:1::/48"), "site").unwrap();
    tree.add(v6("2001:db8:1:2::/64"), "subnet").unwrap();

    let host = v6("2001:db8:1:2::42");
    assert_eq!(tree.find_deepest_tag(host).unwrap(), Some(&"subnet"));
    assert_eq!(
        tree.find_tags(host).unwrap(),
        [&"default", &"doc", &"site", &"subnet"]
    );

    let other_site = v6("2001:db8:2::1");
    assert_eq!(tree.find_deepest_tag(other_site).unwrap(), Some(&"doc"));
    assert_eq!(tree.find_tags(other_site).unwrap(), [&"default", &"doc"]);

    assert_eq!(tree.find_deepest_tag(v6("fe80::1")).unwrap(), Some(&"default"));
}

#[test]
fn full_width_hosts_and_siblings() {
    let mut tree = TreeV6::new();
    let a = v6("2001:db8::1");
    let b = v6("2001:db8::2");
    let c = v6("2001:db8::3");
    tree.add(a, 1).unwrap();
    tree.add(b, 2).unwrap();
    tree.add(c, 3).unwrap();
    assert_eq!(a.length, 128);

    assert_eq!(tree.find_deepest_tag(a).unwrap(), Some(&1));
    assert_eq!(tree.find_deepest_tag(b).unwrap(), Some(&2));
    assert_eq!(tree.find_deepest_tag(c).unwrap(), Some(&3));
    assert_eq!(tree.find_deepest_tag(v6("2001:db8::4")).unwrap(), None);

    // three leaves, two forks, plus the root
    assert_eq!(tree.count_nodes(), 6);

    assert_eq!(tree.delete(b, |t, want| t == want, &2).unwrap(), 1);
    assert_eq!(tree.find_deepest_tag(b).unwrap(), None);
    assert_eq!(tree.find_deepest_tag(c).unwrap(), Some(&3));
    assert_eq!(tree.count_nodes(), 5);
}

#[test]
fn prefix_past_128_bits_is_rejected() {
    let mut tree: TreeV6<u8> = TreeV6::new();
    let bad = IPv6Address::new(1, 129);
    assert_eq!(
        tree.add(bad, 1),
        Err(Error::InvalidPrefix { length: 129, width: 128 })
    );
    assert!(tree.find_tags(bad).is_err());
}

#[test]
fn insert_above_existing_host() {
    let mut tree = TreeV6::new();
    tree.set(v6("2001:db8::1"), "host").unwrap();
    tree.set(v6("2001:db8::/64"), "net").unwrap();
    assert_eq!(tree.count_nodes(), 3);
    assert_eq!(
        tree.find_tags(v6("2001:db8::1")).unwrap(),
        [&"net", &"host"]
    );
    assert_eq!(tree.find_deepest_tag(v6("2001:db8::ffff")).unwrap(), Some(&"net"));

    // removing the /64 splices it out; the host moves up under the root
    assert_eq!(tree.delete(v6("2001:db8::/64"), |_, _| true, &()).unwrap(), 1);
    assert_eq!(tree.count_nodes(), 2);
    assert_eq!(tree.find_deepest_tag(v6("2001:db8::1")).unwrap(), Some(&"host"));
}
