// Kernel types read by the probes, generated from the BTF of Linux 6.18.44
// (/sys/kernel/btf/vmlinux) and trimmed to the members the probes touch.
// Skipped members are kept as opaque padding so every offset below is the
// kernel's own. Regenerate for another kernel with
//   aya-tool generate task_struct nsproxy uts_namespace dentry file mm_struct fs_struct pid > src/vmlinux.rs
// The asserts at the bottom pin the layout this object was built for.

#![allow(non_camel_case_types, dead_code)]

use core::{
	ffi::{c_char, c_int, c_uint, c_ulonglong},
	mem::{offset_of, size_of},
};

pub const MAX_PID_NS_LEVEL: u32 = 32;

#[repr(C)]
pub struct task_struct {
	pub _pad0: [u8; 1136],
	pub mm: *mut mm_struct,
	pub _pad1: [u8; 120],
	pub pid: c_int,
	pub tgid: c_int,
	pub _pad2: [u8; 8],
	pub real_parent: *mut task_struct,
	pub _pad3: [u8; 40],
	pub group_leader: *mut task_struct,
	pub _pad4: [u8; 32],
	pub thread_pid: *mut pid,
	pub _pad5: [u8; 176],
	pub start_time: c_ulonglong,
	pub _pad6: [u8; 256],
	pub fs: *mut fs_struct,
	pub _pad7: [u8; 16],
	pub nsproxy: *mut nsproxy,
	pub _pad8: [u8; 1416],
}

#[repr(C)]
pub struct upid {
	pub nr: c_int,
	pub _pad0: [u8; 4],
	pub ns: *mut pid_namespace,
}

#[repr(C)]
pub struct pid {
	pub _pad0: [u8; 4],
	pub level: c_uint,
	pub _pad1: [u8; 136],
	pub numbers: [upid; 0],
}

#[repr(C)]
pub struct ns_common {
	pub _pad0: [u8; 24],
	pub inum: c_uint,
	pub _pad1: [u8; 52],
}

#[repr(C)]
pub struct nsproxy {
	pub _pad0: [u8; 8],
	pub uts_ns: *mut uts_namespace,
	pub _pad1: [u8; 8],
	pub mnt_ns: *mut mnt_namespace,
	pub pid_ns_for_children: *mut pid_namespace,
	pub _pad2: [u8; 32],
}

#[repr(C)]
pub struct new_utsname {
	pub sysname: [c_char; 65],
	pub nodename: [c_char; 65],
	pub release: [c_char; 65],
	pub version: [c_char; 65],
	pub machine: [c_char; 65],
	pub domainname: [c_char; 65],
}

#[repr(C)]
pub struct uts_namespace {
	pub name: new_utsname,
	pub _pad0: [u8; 18],
	pub ns: ns_common,
}

#[repr(C)]
pub struct mnt_namespace {
	pub ns: ns_common,
	pub _pad0: [u8; 120],
}

#[repr(C)]
pub struct pid_namespace {
	pub _pad0: [u8; 64],
	pub level: c_uint,
	pub _pad1: [u8; 44],
	pub ns: ns_common,
	pub _pad2: [u8; 152],
}

#[repr(C)]
pub struct vfsmount {
	pub mnt_root: *mut dentry,
	pub _pad0: [u8; 24],
}

#[repr(C)]
pub struct path {
	pub mnt: *mut vfsmount,
	pub dentry: *mut dentry,
}

#[repr(C)]
pub struct fs_struct {
	pub _pad0: [u8; 40],
	pub pwd: path,
}

#[repr(C)]
pub struct file {
	pub _pad0: [u8; 64],
	pub f_path: path,
	pub _pad1: [u8; 104],
}

#[repr(C)]
pub struct mm_struct {
	pub _pad0: [u8; 1312],
	pub exe_file: *mut file,
	pub _pad1: [u8; 152],
}

#[repr(C)]
pub struct qstr {
	pub hash_len: c_ulonglong,
	pub name: *const u8,
}

#[repr(C)]
pub struct dentry {
	pub _pad0: [u8; 24],
	pub d_parent: *mut dentry,
	pub d_name: qstr,
	pub _pad1: [u8; 144],
}

// region:    --- Layout

const _: () = assert!(offset_of!(task_struct, mm) == 1136);
const _: () = assert!(offset_of!(task_struct, pid) == 1264);
const _: () = assert!(offset_of!(task_struct, tgid) == 1268);
const _: () = assert!(offset_of!(task_struct, real_parent) == 1280);
const _: () = assert!(offset_of!(task_struct, group_leader) == 1328);
const _: () = assert!(offset_of!(task_struct, thread_pid) == 1368);
const _: () = assert!(offset_of!(task_struct, start_time) == 1552);
const _: () = assert!(offset_of!(task_struct, fs) == 1816);
const _: () = assert!(offset_of!(task_struct, nsproxy) == 1840);
const _: () = assert!(size_of::<task_struct>() == 3264);
const _: () = assert!(offset_of!(upid, nr) == 0);
const _: () = assert!(offset_of!(upid, ns) == 8);
const _: () = assert!(size_of::<upid>() == 16);
const _: () = assert!(offset_of!(pid, level) == 4);
const _: () = assert!(offset_of!(pid, numbers) == 144);
const _: () = assert!(size_of::<pid>() == 144);
const _: () = assert!(offset_of!(ns_common, inum) == 24);
const _: () = assert!(size_of::<ns_common>() == 80);
const _: () = assert!(offset_of!(nsproxy, uts_ns) == 8);
const _: () = assert!(offset_of!(nsproxy, mnt_ns) == 24);
const _: () = assert!(offset_of!(nsproxy, pid_ns_for_children) == 32);
const _: () = assert!(size_of::<nsproxy>() == 72);
const _: () = assert!(offset_of!(new_utsname, sysname) == 0);
const _: () = assert!(offset_of!(new_utsname, nodename) == 65);
const _: () = assert!(offset_of!(new_utsname, release) == 130);
const _: () = assert!(offset_of!(new_utsname, version) == 195);
const _: () = assert!(offset_of!(new_utsname, machine) == 260);
const _: () = assert!(offset_of!(new_utsname, domainname) == 325);
const _: () = assert!(size_of::<new_utsname>() == 390);
const _: () = assert!(offset_of!(uts_namespace, name) == 0);
const _: () = assert!(offset_of!(uts_namespace, ns) == 408);
const _: () = assert!(size_of::<uts_namespace>() == 488);
const _: () = assert!(offset_of!(mnt_namespace, ns) == 0);
const _: () = assert!(size_of::<mnt_namespace>() == 200);
const _: () = assert!(offset_of!(pid_namespace, level) == 64);
const _: () = assert!(offset_of!(pid_namespace, ns) == 112);
const _: () = assert!(size_of::<pid_namespace>() == 344);
const _: () = assert!(offset_of!(vfsmount, mnt_root) == 0);
const _: () = assert!(size_of::<vfsmount>() == 32);
const _: () = assert!(offset_of!(path, mnt) == 0);
const _: () = assert!(offset_of!(path, dentry) == 8);
const _: () = assert!(size_of::<path>() == 16);
const _: () = assert!(offset_of!(fs_struct, pwd) == 40);
const _: () = assert!(size_of::<fs_struct>() == 56);
const _: () = assert!(offset_of!(file, f_path) == 64);
const _: () = assert!(size_of::<file>() == 184);
const _: () = assert!(offset_of!(mm_struct, exe_file) == 1312);
const _: () = assert!(size_of::<mm_struct>() == 1472);
const _: () = assert!(offset_of!(qstr, hash_len) == 0);
const _: () = assert!(offset_of!(qstr, name) == 8);
const _: () = assert!(size_of::<qstr>() == 16);
const _: () = assert!(offset_of!(dentry, d_parent) == 24);
const _: () = assert!(offset_of!(dentry, d_name) == 32);
const _: () = assert!(size_of::<dentry>() == 192);

// endregion: --- Layout
