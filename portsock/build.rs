fn main() {
  cfg_aliases::cfg_aliases! {
      linux: { target_os = "linux" },
      apple: { target_vendor = "apple" },
      // socket(2) and accept4(2) take SOCK_CLOEXEC atomically.
      cloexec_flag: {
        any(
          target_os = "android",
          target_os = "dragonfly",
          target_os = "freebsd",
          target_os = "illumos",
          target_os = "linux",
          target_os = "netbsd",
          target_os = "openbsd",
          target_os = "solaris"
        )
      },
      // sockaddr_in carries a leading length byte.
      sin_len: {
        any(
          apple,
          target_os = "freebsd",
          target_os = "openbsd",
          target_os = "netbsd",
          target_os = "dragonfly"
        )
      },
      nosigpipe_opt: {
        any(apple, target_os = "freebsd", target_os = "netbsd", target_os = "dragonfly")
      },
      nosignal_flag: { any(target_os = "linux", target_os = "android") },
  }
}
