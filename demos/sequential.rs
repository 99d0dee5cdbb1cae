use std::{ffi::CStr, ptr::NonNull};

use rfreelist::{FreeListAllocator, SbrkHeap};

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    SbrkHeap::program_break(),
  );
}

fn main() {
  env_logger::init();

  let mut allocator = FreeListAllocator::with_sbrk();
  let mut bufs: Vec<NonNull<u8>> = Vec::with_capacity(100 - 2);
  let mut previous: Option<NonNull<u8>> = None;

  print_program_break("start");

  // --------------------------------------------------------------------
  // 1) Allocate 2..99 bytes in a row without releasing anything.
  //    Each buffer gets a string of its size's last digit, NUL terminated.
  // --------------------------------------------------------------------
  for size in 2..100_usize {
    let buf = match allocator.allocate(size) {
      Ok(buf) => buf,
      Err(err) => {
        eprintln!("allocate({size}) failed: {err}");
        std::process::exit(1);
      }
    };

    if let Some(previous) = previous {
      println!("  diff: {}", buf.as_ptr().addr() - previous.as_ptr().addr());
    }
    previous = Some(buf);

    unsafe {
      buf.write_bytes(b'0' + (size % 10) as u8, size - 1);
      buf.add(size - 1).write(0);
    }
    bufs.push(buf);
  }

  print_program_break("after allocations");

  // --------------------------------------------------------------------
  // 2) Read every buffer back. A later allocation overlapping an earlier
  //    one would show up as a mangled string here.
  // --------------------------------------------------------------------
  let mut corrupted = 0;
  for (i, buf) in bufs.iter().enumerate() {
    let size = i + 2;
    let text = unsafe { CStr::from_ptr(buf.as_ptr().cast_const().cast()) };
    println!("{i} -> {}", text.to_string_lossy());

    let expected = b'0' + (size % 10) as u8;
    let intact = text.to_bytes().len() == size - 1 && text.to_bytes().iter().all(|&b| b == expected);
    if !intact {
      corrupted += 1;
    }
  }

  // --------------------------------------------------------------------
  // 3) Release everything and allocate once more: the most recently
  //    released block that fits is handed back.
  // --------------------------------------------------------------------
  for buf in &bufs {
    unsafe { allocator.release(buf.as_ptr()) };
  }
  println!("free blocks after release: {}", allocator.free_block_count());

  match allocator.allocate(50) {
    Ok(reused) => println!(
      "allocate(50) -> {:?} (last released = {:?})",
      reused,
      bufs.last().copied()
    ),
    Err(err) => eprintln!("allocate(50) failed: {err}"),
  }

  print_program_break("end");

  if corrupted > 0 {
    eprintln!("{corrupted} buffers were corrupted");
    std::process::exit(1);
  }
  println!("\nAll {} buffers intact.", bufs.len());
}
