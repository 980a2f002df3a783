//! Operator-facing message copy, kept in one place.
//!
//! The directory's operators work in Uzbek, so the success/error/confirmation
//! copy is Uzbek. Command words and log output stay English.

pub const LOADING: &str = "Yuklanmoqda...";
pub const LOADING_USERS: &str = "Foydalanuvchilar yuklanmoqda...";

pub const FILL_ALL_FIELDS: &str = "Iltimos, barcha maydonlarni to'ldiring";
pub const LOGIN_SUCCESS: &str = "Muvaffaqiyatli kirdingiz!";
pub const LOGIN_FAILED: &str = "Kirish amalga oshmadi";
pub const LOGIN_NETWORK_ERROR: &str = "Tarmoq xatosi yoki noto'g'ri ma'lumotlar";

pub const FETCH_FAILED: &str = "API dan foydalanuvchilarni olishda xatolik yuz berdi.";
pub const APPROVE_SUCCESS: &str = "Foydalanuvchi muvaffaqiyatli tasdiqlandi!";
pub const APPROVE_FAILED: &str = "Foydalanuvchini tasdiqlashda xatolik yuz berdi.";
pub const DELETE_SUCCESS: &str = "Foydalanuvchi muvaffaqiyatli o'chirildi!";
pub const DELETE_FAILED: &str = "Foydalanuvchini o'chirishda xatolik yuz berdi.";

pub const STATUS_CHECKED: &str = "Tasdiqlangan";
pub const STATUS_PENDING: &str = "Kutilmoqda";
pub const NO_USERS: &str = "Foydalanuvchilar topilmadi";
pub const NO_USERS_HINT: &str = "Foydalanuvchilar mavjud bo'lganda bu yerda ko'rinadi";

pub fn confirm_delete(full_name: &str) -> String {
    format!(
        "\"{full_name}\" foydalanuvchisini o'chirmoqchimisiz? \
         Bu amal qaytarib bo'lmaydi. (yes/no)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_delete_embeds_name() {
        let message = confirm_delete("Aziza Karimova");
        assert!(message.contains("Aziza Karimova"));
        assert!(message.contains("yes/no"));
    }
}
