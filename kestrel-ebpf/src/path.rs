//! Dentry walk for the task's working directory and executable.
//!
//! Names are copied leaf first into the tail of the scratch buffer, so the
//! finished path is the suffix starting at the last `/` written. The walk
//! stops at the root of the dentry's own mount and after `MAX_PATH_DEPTH`
//! components, whichever comes first.

use core::ptr::addr_of;

use aya_ebpf::helpers::{bpf_probe_read_kernel, bpf_probe_read_kernel_buf};
use kestrel_common::{ScratchBuf, TaskPath, MAX_PATH_DEPTH, SCRATCH_LEN};

use crate::vmlinux::{dentry, task_struct};

const NAME_MAX: usize = 255;

pub unsafe fn resolve<'s>(task: *const task_struct, which: TaskPath, buf: &'s mut ScratchBuf) -> &'s [u8] {
	let leaf = match which {
		TaskPath::Cwd => pwd_dentry(task),
		TaskPath::Exe => exe_dentry(task),
	};
	let Some(mut cur) = leaf else {
		return &buf[..0];
	};

	let mut pos = SCRATCH_LEN;
	for _ in 0..MAX_PATH_DEPTH {
		let Some(parent) = read(addr_of!((*cur).d_parent)).map(<*mut dentry>::cast_const) else {
			break;
		};
		if parent.is_null() || parent == cur {
			break;
		}
		let Some(name) = read(addr_of!((*cur).d_name)) else {
			break;
		};
		let len = ((name.hash_len >> 32) as usize).min(NAME_MAX);
		if len + 1 > pos {
			break;
		}
		if bpf_probe_read_kernel_buf(name.name, &mut buf[pos - len..pos]).is_err() {
			break;
		}
		pos -= len + 1;
		buf[pos] = b'/';
		cur = parent;
	}

	if pos == SCRATCH_LEN {
		pos -= 1;
		buf[pos] = b'/';
	}
	&buf[pos..]
}

unsafe fn read<T>(src: *const T) -> Option<T> {
	bpf_probe_read_kernel(src).ok()
}

unsafe fn pwd_dentry(task: *const task_struct) -> Option<*const dentry> {
	if task.is_null() {
		return None;
	}
	let fs = read(addr_of!((*task).fs))?;
	if fs.is_null() {
		return None;
	}
	let leaf = read(addr_of!((*fs).pwd.dentry))?;
	(!leaf.is_null()).then_some(leaf.cast_const())
}

// kernel threads have no mm and therefore no executable
unsafe fn exe_dentry(task: *const task_struct) -> Option<*const dentry> {
	if task.is_null() {
		return None;
	}
	let mm = read(addr_of!((*task).mm))?;
	if mm.is_null() {
		return None;
	}
	let file = read(addr_of!((*mm).exe_file))?;
	if file.is_null() {
		return None;
	}
	let leaf = read(addr_of!((*file).f_path.dentry))?;
	(!leaf.is_null()).then_some(leaf.cast_const())
}
