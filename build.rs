//! 构建脚本：启用 gui 特性时编译 Slint 界面

fn main() {
    #[cfg(feature = "gui")]
    slint_build::compile("ui/app_window.slint").expect("Slint 界面编译失败");
}
